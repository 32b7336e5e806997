//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::BoardConfig;

/// Load board configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_oscillator::load_config;
///
/// let config = load_config("board.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BoardConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse board configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<BoardConfig> {
    let config: BoardConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{ActiveLevel, Microsteps};

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.speed.max, 400);
        assert_eq!(config.driver.microsteps, Microsteps::SIXTEENTH);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml = r#"
[speed]
max = 300

[driver]
microsteps = 8
input_active = "high"
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.speed.min, 50);
        assert_eq!(config.speed.max, 300);
        assert_eq!(config.driver.microsteps, Microsteps::EIGHTH);
        assert_eq!(config.driver.input_active, ActiveLevel::High);
        assert_eq!(config.timing.homing_step_ms, 40);
    }

    #[test]
    fn test_parse_rejects_unsupported_microsteps() {
        let toml = r#"
[driver]
microsteps = 32
"#;

        let result = parse_config(toml);
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
    }

    #[test]
    fn test_parse_runs_validation() {
        let toml = r#"
[speed]
min = 100
max = 60
"#;

        let result = parse_config(toml);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidSpeedRange { .. }))
        ));
    }
}
