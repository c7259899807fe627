// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const SCHEMA_VERSION: &str = "1.0";

/// Fixed-point scale of `high_component_ratio`.
pub const RATIO_SCALE: u32 = 1_000_000;

/// Highest analog channel number the converter multiplexer can select.
pub const MAX_ADC_CHANNEL: u8 = 27;

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Unsupported schema_version '{0}'. Supported versions: '1.0'")]
    UnsupportedSchema(String),
    #[error("min_threshold must be greater than zero")]
    ZeroThreshold,
    #[error("min_difference ({min_difference}) must be below min_threshold ({min_threshold})")]
    DifferenceNotBelowThreshold {
        min_difference: u16,
        min_threshold: u16,
    },
    #[error("high_component_ratio must be within (0, 1) at a resolution of 0.000001, got {0}")]
    RatioOutOfRange(f32),
    #[error("sample_count must be greater than zero")]
    ZeroSampleCount,
    #[error("adc_channel {0} is out of range (0..=27)")]
    ChannelOutOfRange(u8),
    #[error("adc resolution_bits must be within 8..=12, got {0}")]
    ResolutionOutOfRange(u8),
    #[error("adc max_polls must be greater than conversion_ticks ({conversion_ticks}), got {max_polls}")]
    PollBudgetTooSmall {
        max_polls: u32,
        conversion_ticks: u32,
    },
    #[error("invalid pin name '{0}'; expected R<port><bit>, e.g. RB0")]
    InvalidPin(String),
    #[error("pin {pin} is assigned to both {first} and {second}")]
    DuplicatePin {
        pin: PinId,
        first: String,
        second: String,
    },
    #[error("led_bank must list exactly 8 pins, got {0}")]
    LedBankSize(usize),
    #[error("scene ambient level {ambient} exceeds the converter maximum {adc_max}")]
    AmbientOutOfRange { ambient: u16, adc_max: u16 },
    #[error("reflectance for {channel} must be within 0.0..=1.0, got {value}")]
    ReflectanceOutOfRange { channel: &'static str, value: f32 },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Digital I/O port of the PIC18 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
}

impl Port {
    pub const ALL: [Port; 5] = [Port::A, Port::B, Port::C, Port::D, Port::E];

    pub fn letter(self) -> char {
        match self {
            Port::A => 'A',
            Port::B => 'B',
            Port::C => 'C',
            Port::D => 'D',
            Port::E => 'E',
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Port::A),
            'B' => Some(Port::B),
            'C' => Some(Port::C),
            'D' => Some(Port::D),
            'E' => Some(Port::E),
            _ => None,
        }
    }
}

/// A single digital pin, written in YAML as `RB0`, `RC2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinId {
    pub port: Port,
    pub bit: u8,
}

impl PinId {
    pub const fn new(port: Port, bit: u8) -> Self {
        Self { port, bit }
    }

    pub fn mask(self) -> u8 {
        1 << self.bit
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}{}", self.port.letter(), self.bit)
    }
}

impl FromStr for PinId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_uppercase();
        let rest = v.strip_prefix('R').unwrap_or(&v);
        let mut chars = rest.chars();
        let port = chars
            .next()
            .and_then(Port::from_letter)
            .ok_or_else(|| ConfigError::InvalidPin(value.to_string()))?;
        let bit: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| ConfigError::InvalidPin(value.to_string()))?;
        if bit > 7 {
            return Err(ConfigError::InvalidPin(value.to_string()));
        }
        Ok(Self { port, bit })
    }
}

impl TryFrom<String> for PinId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinId> for String {
    fn from(pin: PinId) -> Self {
        pin.to_string()
    }
}

/// Thresholds and timings of the reflected-light color detector.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    pub min_threshold: u16,
    pub min_difference: u16,
    pub high_component_ratio: f32,
    pub settle_time_ms: u32,
    pub sample_count: u8,
    pub acquisition_time_us: u32,
    pub inter_sample_gap_us: u32,
    pub cycle_delay_ms: u32,
    pub undefined_blink_ms: u32,
    pub adc_channel: u8,
    pub startup_sequence: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_threshold: 50,
            min_difference: 30,
            high_component_ratio: 0.7,
            settle_time_ms: 50,
            sample_count: 10,
            acquisition_time_us: 20,
            inter_sample_gap_us: 100,
            cycle_delay_ms: 1000,
            undefined_blink_ms: 500,
            adc_channel: 0,
            startup_sequence: true,
        }
    }
}

impl DetectorConfig {
    /// The high-component ratio in parts per million, so the comparison
    /// against the dominant channel stays exact. Six decimals is all an
    /// `f32` ratio carries reliably.
    pub fn high_ratio_ppm(&self) -> u32 {
        (self.high_component_ratio as f64 * RATIO_SCALE as f64).round() as u32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.min_difference >= self.min_threshold {
            return Err(ConfigError::DifferenceNotBelowThreshold {
                min_difference: self.min_difference,
                min_threshold: self.min_threshold,
            });
        }
        let ppm = self.high_ratio_ppm();
        if !(self.high_component_ratio > 0.0 && self.high_component_ratio < 1.0)
            || ppm == 0
            || ppm >= RATIO_SCALE
        {
            return Err(ConfigError::RatioOutOfRange(self.high_component_ratio));
        }
        if self.sample_count == 0 {
            return Err(ConfigError::ZeroSampleCount);
        }
        if self.adc_channel > MAX_ADC_CHANNEL {
            return Err(ConfigError::ChannelOutOfRange(self.adc_channel));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IlluminationPins {
    pub red: PinId,
    pub green: PinId,
    pub blue: PinId,
}

impl Default for IlluminationPins {
    fn default() -> Self {
        Self {
            red: PinId::new(Port::C, 0),
            green: PinId::new(Port::C, 1),
            blue: PinId::new(Port::C, 2),
        }
    }
}

impl IlluminationPins {
    pub fn all(&self) -> [PinId; 3] {
        [self.red, self.green, self.blue]
    }
}

/// One indicator output per detectable color.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorPins {
    pub red: PinId,
    pub green: PinId,
    pub blue: PinId,
    pub yellow: PinId,
    pub cyan: PinId,
    pub magenta: PinId,
    pub white: PinId,
    pub black: PinId,
}

impl Default for IndicatorPins {
    fn default() -> Self {
        Self {
            red: PinId::new(Port::B, 0),
            green: PinId::new(Port::B, 1),
            blue: PinId::new(Port::B, 2),
            yellow: PinId::new(Port::B, 3),
            cyan: PinId::new(Port::B, 4),
            magenta: PinId::new(Port::B, 5),
            white: PinId::new(Port::B, 6),
            black: PinId::new(Port::B, 7),
        }
    }
}

impl IndicatorPins {
    pub fn all(&self) -> [PinId; 8] {
        [
            self.red,
            self.green,
            self.blue,
            self.yellow,
            self.cyan,
            self.magenta,
            self.white,
            self.black,
        ]
    }

    fn named(&self) -> [(&'static str, PinId); 8] {
        [
            ("indicators.red", self.red),
            ("indicators.green", self.green),
            ("indicators.blue", self.blue),
            ("indicators.yellow", self.yellow),
            ("indicators.cyan", self.cyan),
            ("indicators.magenta", self.magenta),
            ("indicators.white", self.white),
            ("indicators.black", self.black),
        ]
    }
}

fn default_led_bank() -> Vec<PinId> {
    (0..8).map(|bit| PinId::new(Port::B, bit)).collect()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PinMap {
    pub illumination: IlluminationPins,
    pub indicators: IndicatorPins,
    /// Eight outputs, least significant bit first, driven by the byte-wide programs.
    pub led_bank: Vec<PinId>,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            illumination: IlluminationPins::default(),
            indicators: IndicatorPins::default(),
            led_bank: default_led_bank(),
        }
    }
}

impl PinMap {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Illumination and indicators are driven by the same program, so they
        // must never share a pin. The LED bank belongs to the other programs.
        let mut detector_pins: Vec<(String, PinId)> = vec![
            ("illumination.red".to_string(), self.illumination.red),
            ("illumination.green".to_string(), self.illumination.green),
            ("illumination.blue".to_string(), self.illumination.blue),
        ];
        detector_pins.extend(
            self.indicators
                .named()
                .into_iter()
                .map(|(name, pin)| (name.to_string(), pin)),
        );
        check_unique(&detector_pins)?;

        if self.led_bank.len() != 8 {
            return Err(ConfigError::LedBankSize(self.led_bank.len()));
        }
        let bank: Vec<(String, PinId)> = self
            .led_bank
            .iter()
            .enumerate()
            .map(|(i, pin)| (format!("led_bank[{}]", i), *pin))
            .collect();
        check_unique(&bank)
    }
}

fn check_unique(pins: &[(String, PinId)]) -> Result<(), ConfigError> {
    let mut seen: Vec<(&str, PinId)> = Vec::with_capacity(pins.len());
    for (name, pin) in pins {
        if let Some((first, _)) = seen.iter().find(|(_, p)| p == pin) {
            return Err(ConfigError::DuplicatePin {
                pin: *pin,
                first: first.to_string(),
                second: name.clone(),
            });
        }
        seen.push((name.as_str(), *pin));
    }
    Ok(())
}

/// Fraction of each illumination color reflected by the target, 0.0..=1.0.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Reflectance {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Reflectance {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (channel, value) in [("red", self.red), ("green", self.green), ("blue", self.blue)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ReflectanceOutOfRange { channel, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamedTarget {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
    Black,
    /// Dim, mostly red surface: enough light comes back but no rule claims it.
    #[serde(rename = "dark-red")]
    DarkRed,
}

impl NamedTarget {
    pub const ALL: [NamedTarget; 9] = [
        NamedTarget::Red,
        NamedTarget::Green,
        NamedTarget::Blue,
        NamedTarget::Yellow,
        NamedTarget::Cyan,
        NamedTarget::Magenta,
        NamedTarget::White,
        NamedTarget::Black,
        NamedTarget::DarkRed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NamedTarget::Red => "red",
            NamedTarget::Green => "green",
            NamedTarget::Blue => "blue",
            NamedTarget::Yellow => "yellow",
            NamedTarget::Cyan => "cyan",
            NamedTarget::Magenta => "magenta",
            NamedTarget::White => "white",
            NamedTarget::Black => "black",
            NamedTarget::DarkRed => "dark-red",
        }
    }

    pub fn reflectance(self) -> Reflectance {
        match self {
            NamedTarget::Red => Reflectance::new(0.85, 0.10, 0.10),
            NamedTarget::Green => Reflectance::new(0.10, 0.80, 0.10),
            NamedTarget::Blue => Reflectance::new(0.10, 0.10, 0.80),
            NamedTarget::Yellow => Reflectance::new(0.85, 0.80, 0.10),
            NamedTarget::Cyan => Reflectance::new(0.10, 0.80, 0.80),
            NamedTarget::Magenta => Reflectance::new(0.85, 0.10, 0.80),
            NamedTarget::White => Reflectance::new(0.90, 0.90, 0.90),
            NamedTarget::Black => Reflectance::new(0.02, 0.02, 0.02),
            NamedTarget::DarkRed => Reflectance::new(0.066, 0.016, 0.016),
        }
    }
}

impl FromStr for NamedTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let v = value.trim().to_ascii_lowercase();
        NamedTarget::ALL
            .into_iter()
            .find(|t| t.name() == v)
            .ok_or_else(|| {
                let names: Vec<&str> = NamedTarget::ALL.iter().map(|t| t.name()).collect();
                format!("unknown target '{}'; expected one of: {}", value, names.join(", "))
            })
    }
}

/// Target in front of the sensor: either a named color or explicit reflectance.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum TargetSpec {
    Named(NamedTarget),
    Custom(Reflectance),
}

impl TargetSpec {
    pub fn reflectance(&self) -> Reflectance {
        match self {
            TargetSpec::Named(name) => name.reflectance(),
            TargetSpec::Custom(r) => *r,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChannelLevels {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Physical setup seen by the light-dependent resistor on the simulated board.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Reading contributed by environmental light, in converter counts.
    pub ambient: u16,
    pub target: TargetSpec,
    /// Reading a fully reflective target adds when each LED is lit.
    pub led_intensity: ChannelLevels,
    /// First-order response time of the LDR; 0 means it follows instantly.
    pub response_time_ms: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ambient: 120,
            target: TargetSpec::Named(NamedTarget::Red),
            led_intensity: ChannelLevels {
                red: 600,
                green: 600,
                blue: 600,
            },
            response_time_ms: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AdcConfig {
    pub resolution_bits: u8,
    /// Ticks between setting GO/nDONE and the result being ready.
    pub conversion_ticks: u32,
    /// Status polls before a conversion is reported as timed out.
    pub max_polls: u32,
    /// Fault injection: conversions never complete.
    pub stuck: bool,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            resolution_bits: 10,
            conversion_ticks: 11,
            max_polls: 1000,
            stuck: false,
        }
    }
}

impl AdcConfig {
    pub fn adc_max(&self) -> u16 {
        ((1u32 << self.resolution_bits) - 1) as u16
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8..=12).contains(&self.resolution_bits) {
            return Err(ConfigError::ResolutionOutOfRange(self.resolution_bits));
        }
        if self.max_polls <= self.conversion_ticks {
            return Err(ConfigError::PollBudgetTooSmall {
                max_polls: self.max_polls,
                conversion_ticks: self.conversion_ticks,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BlinkConfig {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            on_ms: 1000,
            off_ms: 1000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub step_ms: u32,
    /// Only the low seven outputs count; the top one stays low.
    pub seven_bit: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            step_ms: 200,
            seven_bit: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PatternsConfig {
    pub step_ms: u32,
    pub intro_blink_ms: u32,
    pub intro_blinks: u8,
    pub intro_pause_ms: u32,
    pub separator_blink_ms: u32,
    pub separator_blinks: u8,
    pub section_pause_ms: u32,
    pub cycle_pause_ms: u32,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            step_ms: 1000,
            intro_blink_ms: 100,
            intro_blinks: 6,
            intro_pause_ms: 1000,
            separator_blink_ms: 200,
            separator_blinks: 3,
            section_pause_ms: 500,
            cycle_pause_ms: 2000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramsConfig {
    pub blink: BlinkConfig,
    pub counter: CounterConfig,
    pub patterns: PatternsConfig,
}

impl ProgramsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("programs.blink.on_ms", self.blink.on_ms),
            ("programs.blink.off_ms", self.blink.off_ms),
            ("programs.counter.step_ms", self.counter.step_ms),
            ("programs.patterns.step_ms", self.patterns.step_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub pins: PinMap,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub adc: AdcConfig,
    #[serde(default)]
    pub programs: ProgramsConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            detector: DetectorConfig::default(),
            pins: PinMap::default(),
            scene: SceneConfig::default(),
            adc: AdcConfig::default(),
            programs: ProgramsConfig::default(),
        }
    }
}

impl LabConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config {:?}", path))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults".
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).context("Failed to parse config YAML")?
        };
        config.validate()?;
        tracing::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchema(self.schema_version.clone()));
        }
        self.detector.validate()?;
        self.pins.validate()?;
        self.adc.validate()?;
        self.programs.validate()?;

        let adc_max = self.adc.adc_max();
        if self.scene.ambient > adc_max {
            return Err(ConfigError::AmbientOutOfRange {
                ambient: self.scene.ambient,
                adc_max,
            });
        }
        self.scene.target.reflectance().validate()?;

        let illumination: HashSet<PinId> = self.pins.illumination.all().into_iter().collect();
        if let Some(pin) = self.pins.led_bank.iter().find(|p| illumination.contains(p)) {
            tracing::warn!(
                "LED bank pin {} doubles as an illumination output; byte programs will light it",
                pin
            );
        }
        Ok(())
    }
}
