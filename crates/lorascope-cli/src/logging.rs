use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the stderr log subscriber.
/// Falls back to WARN if the level is not recognised.
pub fn init_logging(log_level: &str) {
    FmtSubscriber::builder()
        .with_target(false)
        .with_max_level(parse_level(log_level))
        .with_writer(std::io::stderr)
        .init();
}

fn parse_level(log_level: &str) -> Level {
    log_level.parse::<Level>().unwrap_or(Level::WARN)
}
