use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lorascope_core::{AnalysisOptions, DecoderKind, Report, analyze_uplink_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.jsonl");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_report.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

/// Keep the decoder recorded in an existing report; new cases use the default.
fn existing_decoder(output: &Path) -> DecoderKind {
    fs::read_to_string(output)
        .ok()
        .and_then(|json| serde_json::from_str::<Report>(&json).ok())
        .map(|report| report.decoder)
        .unwrap_or_default()
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let options = AnalysisOptions {
        decoder: existing_decoder(output),
        ..AnalysisOptions::default()
    };
    let report = analyze_uplink_file(input, &options)
        .map_err(|err| format!("analysis failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
