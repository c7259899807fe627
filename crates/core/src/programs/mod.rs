// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod blink;
pub mod counter;
pub mod patterns;

pub use blink::Blink;
pub use counter::Counter;
pub use patterns::Patterns;

use crate::detector::ColorDetector;
use crate::signals::DigitalLevel;
use crate::{Board, PinId};
use bitflags::bitflags;
use ldrlab_config::{ConfigError, LabConfig};
use std::str::FromStr;

/// A program that runs forever on a board: once `start`, then `run_cycle`
/// in a loop.
pub trait Program<B: Board> {
    fn name(&self) -> &'static str;

    fn start(&mut self, board: &mut B);

    fn run_cycle(&mut self, board: &mut B);
}

impl<B: Board> Program<B> for ColorDetector {
    fn name(&self) -> &'static str {
        ProgramKind::ColorDetector.name()
    }

    fn start(&mut self, board: &mut B) {
        ColorDetector::start(self, board);
    }

    fn run_cycle(&mut self, board: &mut B) {
        self.cycle(board);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    ColorDetector,
    Blink,
    Counter,
    Patterns,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 4] = [
        ProgramKind::ColorDetector,
        ProgramKind::Blink,
        ProgramKind::Counter,
        ProgramKind::Patterns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::ColorDetector => "color-detector",
            ProgramKind::Blink => "blink",
            ProgramKind::Counter => "counter",
            ProgramKind::Patterns => "patterns",
        }
    }

    /// Builds the program with its settings from `config`.
    pub fn build<B: Board>(self, config: &LabConfig) -> Box<dyn Program<B>> {
        match self {
            ProgramKind::ColorDetector => Box::new(ColorDetector::new(config)),
            ProgramKind::Blink => {
                Box::new(Blink::new(&config.programs.blink, LedBank::new(config)))
            }
            ProgramKind::Counter => {
                Box::new(Counter::new(&config.programs.counter, LedBank::new(config)))
            }
            ProgramKind::Patterns => Box::new(Patterns::new(
                &config.programs.patterns,
                LedBank::new(config),
            )),
        }
    }
}

impl FromStr for ProgramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgramKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown program '{}'", s))
    }
}

bitflags! {
    /// One bit per LED of an 8-pin bank, bit 0 driving the first pin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LedMask: u8 {
        const LED0 = 1 << 0;
        const LED1 = 1 << 1;
        const LED2 = 1 << 2;
        const LED3 = 1 << 3;
        const LED4 = 1 << 4;
        const LED5 = 1 << 5;
        const LED6 = 1 << 6;
        const LED7 = 1 << 7;
    }
}

impl LedMask {
    pub fn single(bit: u8) -> Self {
        Self::from_bits_retain(1u8.wrapping_shl(bit as u32))
    }
}

/// Eight outputs written together as one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedBank {
    pins: [PinId; 8],
}

impl LedBank {
    /// Bank from the configured pin list. `PinMap::validate` guarantees
    /// eight entries; a shorter list leaves the tail on the default pins.
    pub fn new(config: &LabConfig) -> Self {
        let mut bank = Self::default();
        for (slot, pin) in bank.pins.iter_mut().zip(&config.pins.led_bank) {
            *slot = *pin;
        }
        bank
    }

    pub fn from_pins(pins: &[PinId]) -> Result<Self, ConfigError> {
        let pins: [PinId; 8] = pins
            .try_into()
            .map_err(|_| ConfigError::LedBankSize(pins.len()))?;
        Ok(Self { pins })
    }

    pub fn pins(&self) -> &[PinId; 8] {
        &self.pins
    }

    pub fn show<B: Board>(&self, board: &mut B, mask: LedMask) {
        for (bit, pin) in self.pins.iter().enumerate() {
            let lit = mask.contains(LedMask::single(bit as u8));
            board.set_output(*pin, DigitalLevel::from(lit));
        }
    }

    /// Lights every LED for `on_ms` then darkens them for `off_ms`, `times` times.
    pub fn flash<B: Board>(&self, board: &mut B, times: u8, on_ms: u32, off_ms: u32) {
        for _ in 0..times {
            self.show(board, LedMask::all());
            board.delay_ms(on_ms);
            self.show(board, LedMask::empty());
            board.delay_ms(off_ms);
        }
    }
}

impl Default for LedBank {
    fn default() -> Self {
        let mut pins = [PinId::new(crate::Port::B, 0); 8];
        for (bit, pin) in pins.iter_mut().enumerate() {
            pin.bit = bit as u8;
        }
        Self { pins }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::signals::DigitalLevel;
    use crate::{AnalogInput, DelayNs, DigitalOutputs, PinId, SensorError};
    use std::collections::HashMap;

    /// Records output levels and elapsed time; the sensor always reads 0.
    #[derive(Debug, Default)]
    pub struct RecordingBoard {
        pub levels: HashMap<PinId, DigitalLevel>,
        pub writes: Vec<(u64, PinId, DigitalLevel)>,
        pub elapsed_ns: u64,
    }

    impl RecordingBoard {
        pub fn now_ms(&self) -> u64 {
            self.elapsed_ns / 1_000_000
        }

        pub fn byte(&self, pins: &[PinId; 8]) -> u8 {
            byte_of(&self.levels, pins)
        }

        /// Byte shown on `pins` after each delay, collapsing repeats.
        pub fn frames(&self, pins: &[PinId; 8]) -> Vec<u8> {
            let mut levels: HashMap<PinId, DigitalLevel> = HashMap::new();
            let mut frames: Vec<u8> = Vec::new();
            let mut last_time = None;
            for (time, pin, level) in &self.writes {
                if last_time.is_some() && last_time != Some(*time) {
                    push_frame(&mut frames, &levels, pins);
                }
                levels.insert(*pin, *level);
                last_time = Some(*time);
            }
            push_frame(&mut frames, &levels, pins);
            frames
        }
    }

    fn byte_of(levels: &HashMap<PinId, DigitalLevel>, pins: &[PinId; 8]) -> u8 {
        pins.iter()
            .enumerate()
            .filter(|(_, pin)| levels.get(*pin) == Some(&DigitalLevel::High))
            .fold(0u8, |acc, (bit, _)| acc | (1 << bit))
    }

    fn push_frame(
        frames: &mut Vec<u8>,
        levels: &HashMap<PinId, DigitalLevel>,
        pins: &[PinId; 8],
    ) {
        let byte = byte_of(levels, pins);
        if frames.last() != Some(&byte) {
            frames.push(byte);
        }
    }

    impl DigitalOutputs for RecordingBoard {
        fn set_output(&mut self, pin: PinId, level: DigitalLevel) {
            self.levels.insert(pin, level);
            self.writes.push((self.elapsed_ns, pin, level));
        }
    }

    impl AnalogInput for RecordingBoard {
        fn read_analog(&mut self, _channel: u8) -> Result<u16, SensorError> {
            Ok(0)
        }
    }

    impl DelayNs for RecordingBoard {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ns += ns as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingBoard;
    use super::*;
    use crate::Port;

    #[test]
    fn test_show_writes_each_bit() {
        let bank = LedBank::default();
        let mut board = RecordingBoard::default();
        bank.show(&mut board, LedMask::from_bits_retain(0b1010_0101));
        assert_eq!(board.byte(bank.pins()), 0b1010_0101);
        assert_eq!(board.writes.len(), 8);
        assert_eq!(bank.pins()[7], PinId::new(Port::B, 7));
    }

    #[test]
    fn test_bank_from_pins_requires_eight() {
        let pins = [PinId::new(Port::D, 0); 3];
        assert_eq!(LedBank::from_pins(&pins), Err(ConfigError::LedBankSize(3)));
        let bank = LedBank::from_pins(LedBank::default().pins()).unwrap();
        assert_eq!(bank, LedBank::default());
    }

    #[test]
    fn test_program_kind_names() {
        for kind in ProgramKind::ALL {
            assert_eq!(kind.name().parse::<ProgramKind>(), Ok(kind));
        }
        assert!("disco".parse::<ProgramKind>().is_err());
    }

    #[test]
    fn test_single_mask() {
        assert_eq!(LedMask::single(0), LedMask::LED0);
        assert_eq!(LedMask::single(7), LedMask::LED7);
    }
}
