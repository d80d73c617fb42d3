use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("lorascope"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn fixture(name: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(name)
        .join("input.jsonl")
}

#[test]
fn help_supports_analyse_and_analyze() {
    for verb in ["analyse", "analyze"] {
        cmd()
            .args(["uplinks", verb, "--help"])
            .assert()
            .success()
            .stdout(contains("Thresholds"));
    }
}

#[test]
fn version_includes_build_info() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("lorascope"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.jsonl");
    let report = temp.path().join("report.json");

    cmd()
        .args(["uplinks", "analyze"])
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("uplinks.csv");
    std::fs::write(&input, "dev_eui,f_cnt\n").expect("write input");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(&input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn stdout_outputs_valid_json() {
    let output = cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .arg("--stdout")
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["report_version"], 1);
    assert_eq!(json["tool"]["name"], "lorascope");
    assert_eq!(json["decoder"], "heltec");
    assert_eq!(json["capture_summary"]["uplinks_total"], 5);
}

#[test]
fn report_file_is_written() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("nested").join("report.json");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("sodaq_sequence"))
        .args(["--decoder", "sodaq", "--pretty", "-o"])
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let text = std::fs::read_to_string(&report).expect("read report");
    assert!(text.contains('\n'));
    let json: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(json["decoder"], "sodaq");
}

#[test]
fn stdout_conflicts_with_report() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn pretty_conflicts_with_compact() {
    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .args(["--stdout", "--pretty", "--compact"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn quiet_suppresses_ok_line() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
    assert!(report.exists());
}

#[test]
fn report_must_not_overwrite_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("uplinks.json");
    std::fs::copy(fixture("heltec_mixed"), &input).expect("copy fixture");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn list_alerts_prints_ids() {
    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .args(["--stdout", "--list-alerts"])
        .assert()
        .success()
        .stderr(contains("Alerts:").and(contains("UL-FCNT-GAP")));
}

#[test]
fn strict_fails_on_warnings() {
    cmd()
        .args(["uplinks", "analyse"])
        .arg(fixture("heltec_mixed"))
        .args(["--stdout", "--strict"])
        .assert()
        .code(2)
        .stderr(contains("alerts detected").and(contains("--list-alerts")));
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    for name in ["a.jsonl", "b.jsonl"] {
        std::fs::copy(fixture("heltec_mixed"), temp.path().join(name)).expect("copy fixture");
    }
    let pattern = temp.path().join("*.jsonl");

    cmd()
        .args(["uplinks", "analyse"])
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("multiple files match"));
}

#[test]
fn decode_heltec_hex() {
    cmd()
        .args(["decode", "4849213F05"])
        .assert()
        .success()
        .stdout(contains(r#"{"data":{"text":"HI!?","count":5}}"#));
}

#[test]
fn decode_sodaq_without_counts() {
    cmd()
        .args(["decode", "--decoder", "sodaq", "4849213F"])
        .assert()
        .success()
        .stdout(contains(r#"{"data":{"text":"HI!?","count":[]}}"#));
}

#[test]
fn decode_sodaq_base64() {
    cmd()
        .args(["decode", "--format", "base64", "--decoder", "sodaq", "SEkhPwUGBw=="])
        .assert()
        .success()
        .stdout(contains(r#""count":[5,6,7]"#));
}

#[test]
fn decode_short_payload_fails_with_hint() {
    cmd()
        .args(["decode", "4849213F"])
        .assert()
        .code(2)
        .stderr(contains("input too short").and(contains("hint:")));
}

#[test]
fn decode_json_rejects_out_of_range_byte() {
    cmd()
        .args(["decode", "--format", "json", r#"{"bytes":[72,73,33,63,256]}"#])
        .assert()
        .failure()
        .stderr(contains("invalid byte value"));
}

#[test]
fn decode_json_rejects_fractional_byte_with_hint() {
    cmd()
        .args(["decode", "--format", "json", r#"{"bytes":[72,73,33,63,5.5]}"#])
        .assert()
        .code(2)
        .stderr(
            contains("invalid byte value at index 4")
                .and(contains("hint: payload bytes must be integers in 0..=255")),
        );
}

#[test]
fn decode_reads_payload_file() {
    let temp = TempDir::new().expect("tempdir");
    let payload = temp.path().join("payload.hex");
    std::fs::write(&payload, "48 49 21 3F 2A\n").expect("write payload");

    cmd()
        .arg("decode")
        .arg("-i")
        .arg(&payload)
        .assert()
        .success()
        .stdout(contains(r#""count":42"#));
}
