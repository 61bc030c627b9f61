use std::str::FromStr;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;

/// Parse a level name such as `warn` or `DEBUG`; unknown names fall back
/// to `WARN`.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::WARN)
}

/// Install the global subscriber. Logs go to stderr so the report on
/// stdout stays clean.
pub fn init_tracing(level: Level, json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(true);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("ERROR"), Level::ERROR);
        assert_eq!(parse_level(" info "), Level::INFO);
    }

    #[test]
    fn unknown_level_is_warn() {
        assert_eq!(parse_level("loud"), Level::WARN);
    }
}
