use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use lorascope_core::{
    AnalysisOptions, DecodeError, DecoderKind, InputError, Report, Severity, UplinkInput,
};
use tracing::info;

mod logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LORASCOPE_BUILD_COMMIT"),
    " ",
    env!("LORASCOPE_BUILD_DATE"),
    ")"
);

const DECODE_EXAMPLES: &str = "Examples:\n  lorascope decode 4849213F05\n  lorascope decode --decoder sodaq --format base64 SEkhPwUGBw==\n  lorascope decode --format json '{\"bytes\":[72,73,33,63,5]}'";
const ANALYSE_EXAMPLES: &str = "Examples:\n  lorascope uplinks analyse uplinks.jsonl -o report.json\n  lorascope uplinks analyze uplinks.jsonl --stdout --decoder sodaq";

#[derive(Parser, Debug)]
#[command(name = "lorascope")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and offline sanity checker for LoRaWAN sensor uplinks (Heltec / Sodaq payloads).",
    long_about = None,
    after_help = "Examples:\n  lorascope decode 4849213F05\n  lorascope uplinks analyse uplinks.jsonl -o report.json"
)]
struct Cli {
    /// Diagnostic log level on stderr (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single uplink payload and print `{"data": {...}}` as JSON.
    #[command(after_help = DECODE_EXAMPLES)]
    Decode(DecodeArgs),
    /// Operations on recorded TTN uplink webhooks (JSON Lines).
    Uplinks {
        #[command(subcommand)]
        command: UplinkCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UplinkCommands {
    /// Analyse recorded uplinks and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(after_help = ANALYSE_EXAMPLES)]
    Analyse(AnalyseArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Encoded payload (see --format)
    #[arg(required_unless_present = "input")]
    payload: Option<String>,

    /// Read the encoded payload from a file
    #[arg(short = 'i', long, conflicts_with = "payload")]
    input: Option<PathBuf>,

    /// Payload layout
    #[arg(short, long, value_enum, default_value_t = DecoderArg::Heltec)]
    decoder: DecoderArg,

    /// Payload encoding
    #[arg(short, long, value_enum, default_value_t = PayloadFormat::Hex)]
    format: PayloadFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Path to a JSON Lines file of TTN uplink webhooks
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if error or warning alerts are present
    #[arg(long)]
    strict: bool,

    /// List alerts after analysis
    #[arg(long)]
    list_alerts: bool,

    /// Payload layout used for every uplink
    #[arg(short, long, value_enum, default_value_t = DecoderArg::Heltec)]
    decoder: DecoderArg,

    #[command(flatten)]
    thresholds: ThresholdArgs,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Thresholds")]
struct ThresholdArgs {
    /// Nominal uplink period in seconds
    #[arg(long, default_value_t = 10.0)]
    expected_interval: f64,

    /// Intervals above this many seconds are long delays
    #[arg(long, default_value_t = 20.0)]
    max_time_gap: f64,

    /// Frame counter gaps above this are potential loss
    #[arg(long, default_value_t = 10)]
    max_fcnt_gap: u64,

    /// RSSI (dBm) below which RF is very poor
    #[arg(long, default_value_t = -120.0, allow_negative_numbers = true)]
    rssi_bad: f64,

    /// RSSI (dBm) below which RF is low
    #[arg(long, default_value_t = -115.0, allow_negative_numbers = true)]
    rssi_low: f64,

    /// RSSI (dBm) above which RF is good
    #[arg(long, default_value_t = -100.0, allow_negative_numbers = true)]
    rssi_good: f64,

    /// SNR (dB) below which RF is very poor
    #[arg(long, default_value_t = -15.0, allow_negative_numbers = true)]
    snr_bad: f64,

    /// SNR (dB) below which RF is low
    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
    snr_low: f64,

    /// SNR (dB) above which RF is good
    #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
    snr_good: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DecoderArg {
    /// 4 text bytes + 1 count byte
    Heltec,
    /// 4 text bytes + count sequence
    Sodaq,
}

impl From<DecoderArg> for DecoderKind {
    fn from(value: DecoderArg) -> Self {
        match value {
            DecoderArg::Heltec => DecoderKind::Heltec,
            DecoderArg::Sodaq => DecoderKind::Sodaq,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PayloadFormat {
    /// Hex digits, optional 0x prefix and spaces
    Hex,
    /// Standard base64 (TTN frm_payload)
    Base64,
    /// Host calling convention: {"bytes": [...]}
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode(args),
        Commands::Uplinks { command } => match command {
            UplinkCommands::Analyse(args) => cmd_uplinks_analyse(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let encoded = match (args.payload, args.input) {
        (Some(payload), _) => payload,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?,
        (None, None) => {
            return Err(CliError::new(
                "missing payload",
                Some("pass a payload or use -i/--input".to_string()),
            ));
        }
    };

    let input = parse_payload(&encoded, args.format)?;
    let kind = DecoderKind::from(args.decoder);
    let output =
        lorascope_core::decode_uplink(kind, &input).map_err(|err| decode_failure(kind, err))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn parse_payload(encoded: &str, format: PayloadFormat) -> Result<UplinkInput, CliError> {
    let parsed = match format {
        PayloadFormat::Hex => UplinkInput::from_hex(encoded),
        PayloadFormat::Base64 => UplinkInput::from_base64(encoded),
        PayloadFormat::Json => UplinkInput::from_json_str(encoded),
    };
    parsed.map_err(|err| {
        let hint = match &err {
            InputError::Hex(_) => "expected an even number of hex digits, e.g. 4849213F05",
            InputError::Base64(_) => "expected standard base64, e.g. SEkhPwU=",
            InputError::Json(_) => "expected an object like {\"bytes\":[72,73,33,63,5]}",
            InputError::Decode(_) => "payload bytes must be integers in 0..=255",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    })
}

// Byte range failures surface earlier, from `parse_payload`.
fn decode_failure(kind: DecoderKind, err: DecodeError) -> CliError {
    let hint = matches!(err, DecodeError::InputTooShort { .. })
        .then(|| format!("{} payloads need at least {} bytes", kind, kind.min_len()));
    CliError::new(err.to_string(), hint)
}

fn analysis_options(args: &AnalyseArgs) -> AnalysisOptions {
    let thresholds = &args.thresholds;
    AnalysisOptions {
        decoder: args.decoder.into(),
        expected_interval_s: thresholds.expected_interval,
        max_time_gap_s: thresholds.max_time_gap,
        max_fcnt_gap: thresholds.max_fcnt_gap,
        rssi_bad: thresholds.rssi_bad,
        rssi_low: thresholds.rssi_low,
        rssi_good: thresholds.rssi_good,
        snr_bad: thresholds.snr_bad,
        snr_low: thresholds.snr_low,
        snr_good: thresholds.snr_good,
    }
}

fn cmd_uplinks_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if args.stdout {
        None
    } else {
        let path = args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?;
        ensure_distinct_output(&path, &input_abs)?;
        Some(path)
    };

    let options = analysis_options(&args);
    let rep = lorascope_core::analyze_uplink_file(&resolved_input, &options)
        .context("uplink analysis failed")?;
    info!(
        devices = rep.devices.len(),
        alerts = rep.alerts.len(),
        decoder = %options.decoder,
        "analysis complete"
    );
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => println!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", path.display());
            }
        }
    }

    if args.list_alerts && !args.quiet {
        print_alerts(&rep);
    }
    if args.strict && has_blocking_alerts(&rep) {
        return Err(CliError::new(
            "error or warning alerts detected",
            Some("use --list-alerts to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report: &PathBuf, input_abs: &PathBuf) -> Result<(), CliError> {
    let parent = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    // A parent that does not exist yet cannot contain the input.
    let Ok(report_dir) = fs::canonicalize(&parent) else {
        return Ok(());
    };
    let file_name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report.display()))?;
    if report_dir.join(file_name) == *input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = if pretty {
        serde_json::to_string_pretty(rep)
    } else {
        serde_json::to_string(rep)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn has_blocking_alerts(rep: &Report) -> bool {
    rep.alerts
        .iter()
        .any(|alert| alert.severity != Severity::Info)
}

fn print_alerts(rep: &Report) {
    eprintln!("Alerts:");
    for alert in &rep.alerts {
        eprintln!(
            "  {} {} ({})",
            alert.severity.as_str(),
            alert.id,
            alert.count
        );
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .jsonl file of TTN uplink webhooks".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .jsonl file of TTN uplink webhooks".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !matches!(ext.as_str(), "jsonl" | "ndjson" | "json") {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .jsonl, .ndjson or .json file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .jsonl".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single uplink file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
