// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use ldrlab_config::{ConfigError, LabConfig, NamedTarget, PinId, Port, TargetSpec};
use std::io::Write;

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_file_parses() {
    let file = write_config(
        r#"
schema_version: "1.0"
detector:
  min_threshold: 60
  min_difference: 25
  high_component_ratio: 0.65
  settle_time_ms: 20
  sample_count: 4
  cycle_delay_ms: 500
  startup_sequence: false
pins:
  illumination: { red: RD0, green: RD1, blue: RD2 }
  led_bank: [RD0, RD1, RD2, RD3, RD4, RD5, RD6, RD7]
scene:
  ambient: 80
  target: dark-red
  led_intensity: { red: 500, green: 550, blue: 650 }
  response_time_ms: 0
adc:
  resolution_bits: 12
  conversion_ticks: 20
programs:
  counter: { step_ms: 100, seven_bit: false }
  patterns: { intro_blinks: 2 }
"#,
    );
    let config = LabConfig::from_file(file.path()).unwrap();
    assert_eq!(config.detector.min_threshold, 60);
    assert_eq!(config.detector.high_ratio_ppm(), 650_000);
    assert!(!config.detector.startup_sequence);
    assert_eq!(config.pins.illumination.red, PinId::new(Port::D, 0));
    // Unlisted pins keep their defaults.
    assert_eq!(config.pins.indicators.white, PinId::new(Port::B, 6));
    assert_eq!(config.scene.target, TargetSpec::Named(NamedTarget::DarkRed));
    assert_eq!(config.adc.adc_max(), 4095);
    assert_eq!(config.adc.max_polls, 1000);
    assert!(!config.programs.counter.seven_bit);
    assert_eq!(config.programs.patterns.intro_blinks, 2);
    assert_eq!(config.programs.patterns.intro_pause_ms, 1000);
}

#[test]
fn test_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = LabConfig::from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.yaml"));
}

#[test]
fn test_unsupported_schema() {
    let file = write_config("schema_version: \"2.0\"\n");
    let err = LabConfig::from_file(file.path()).unwrap_err();
    let root = err.root_cause().downcast_ref::<ConfigError>().cloned();
    assert_eq!(root, Some(ConfigError::UnsupportedSchema("2.0".to_string())));
}

#[test]
fn test_bad_pin_name() {
    let file = write_config("pins:\n  indicators: { red: RB9 }\n");
    let err = LabConfig::from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("RB9"));
}

#[test]
fn test_ambient_above_adc_range() {
    let file = write_config("adc: { resolution_bits: 8 }\nscene: { ambient: 300 }\n");
    let err = LabConfig::from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("300"));
}

#[test]
fn test_adc_channel_range() {
    let file = write_config("detector: { adc_channel: 28 }\n");
    let err = LabConfig::from_file(file.path()).unwrap_err();
    let root = err.root_cause().downcast_ref::<ConfigError>().cloned();
    assert_eq!(root, Some(ConfigError::ChannelOutOfRange(28)));
}

#[test]
fn test_round_trip_through_yaml() {
    let config = LabConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(yaml.contains("RB0"));
    assert_eq!(LabConfig::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_shipped_configs_load() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs");
    let mut loaded = 0;
    for entry in std::fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        LabConfig::from_file(&path).unwrap_or_else(|e| panic!("{:?}: {:#}", path, e));
        loaded += 1;
    }
    assert!(loaded >= 5);

    let default = LabConfig::from_file(dir.join("default.yaml")).unwrap();
    assert_eq!(default, LabConfig::default());
}
