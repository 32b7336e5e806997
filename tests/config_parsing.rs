//! Tests for TOML board configuration loading.

use std::fs;

use stepper_oscillator::config::{load_config, parse_config};
use stepper_oscillator::error::ConfigError;
use stepper_oscillator::{ActiveLevel, BoardConfig, Error, Microsteps};

const FULL_CONFIG: &str = r#"
[speed]
min = 80
max = 320
increment = 4

[timing]
ramp_tick_ms = 10
calibration_step_ms = 30
homing_step_ms = 20
limp_ms = 500

[driver]
microsteps = 4
input_active = "high"
"#;

/// Every field can be overridden.
#[test]
fn test_parse_full_config() {
    let config = parse_config(FULL_CONFIG).expect("valid config");

    assert_eq!(config.speed.min, 80);
    assert_eq!(config.speed.max, 320);
    assert_eq!(config.speed.increment, 4);
    assert_eq!(config.timing.ramp_tick_ms, 10);
    assert_eq!(config.timing.calibration_step_ms, 30);
    assert_eq!(config.timing.homing_step_ms, 20);
    assert_eq!(config.timing.limp_ms, 500);
    assert_eq!(config.driver.microsteps, Microsteps::QUARTER);
    assert_eq!(config.driver.input_active, ActiveLevel::High);
}

/// Parsing with toml directly skips validation.
#[test]
fn test_toml_direct_skips_validation() {
    let toml_str = r#"
[speed]
increment = 0
"#;

    let config: BoardConfig = toml::from_str(toml_str).expect("well-formed TOML");
    assert_eq!(config.speed.increment, 0);

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidSpeedIncrement(0)))
    ));
}

#[test]
fn test_parse_rejects_unknown_polarity() {
    let toml_str = r#"
[driver]
input_active = "sideways"
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

#[test]
fn test_parse_rejects_zero_ramp_tick() {
    let toml_str = r#"
[timing]
ramp_tick_ms = 0
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::InvalidRampTick))
    ));
}

#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!(
        "stepper-oscillator-{}.toml",
        std::process::id()
    ));
    fs::write(&path, FULL_CONFIG).expect("write temp config");

    let config = load_config(&path);
    let _ = fs::remove_file(&path);

    assert_eq!(config.expect("loads").speed.max, 320);
}

#[test]
fn test_load_missing_file() {
    let result = load_config("/nonexistent/stepper-oscillator/board.toml");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::IoError(_)))
    ));
}
