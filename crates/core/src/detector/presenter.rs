// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::ColorLabel;
use crate::signals::DigitalLevel;
use crate::{Board, PinId};
use ldrlab_config::{DetectorConfig, IndicatorPins};

/// What the indicator outputs show for a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPattern {
    Single(PinId),
    /// Every indicator pulses on then off once.
    BlinkAll,
}

#[derive(Debug, Clone)]
pub struct Presenter {
    indicators: IndicatorPins,
    blink_ms: u32,
}

impl Presenter {
    pub fn new(config: &DetectorConfig, indicators: &IndicatorPins) -> Self {
        Self {
            indicators: indicators.clone(),
            blink_ms: config.undefined_blink_ms,
        }
    }

    pub fn pattern(&self, label: ColorLabel) -> IndicatorPattern {
        let pins = &self.indicators;
        match label {
            ColorLabel::Red => IndicatorPattern::Single(pins.red),
            ColorLabel::Green => IndicatorPattern::Single(pins.green),
            ColorLabel::Blue => IndicatorPattern::Single(pins.blue),
            ColorLabel::Yellow => IndicatorPattern::Single(pins.yellow),
            ColorLabel::Cyan => IndicatorPattern::Single(pins.cyan),
            ColorLabel::Magenta => IndicatorPattern::Single(pins.magenta),
            ColorLabel::White => IndicatorPattern::Single(pins.white),
            ColorLabel::Black => IndicatorPattern::Single(pins.black),
            ColorLabel::Undefined => IndicatorPattern::BlinkAll,
        }
    }

    pub fn present<B: Board>(&self, board: &mut B, label: ColorLabel) {
        self.clear(board);
        match self.pattern(label) {
            IndicatorPattern::Single(pin) => board.set_high(pin),
            IndicatorPattern::BlinkAll => {
                self.set_all(board, DigitalLevel::High);
                board.delay_ms(self.blink_ms);
                self.set_all(board, DigitalLevel::Low);
                board.delay_ms(self.blink_ms);
            }
        }
    }

    pub fn clear<B: Board>(&self, board: &mut B) {
        self.set_all(board, DigitalLevel::Low);
    }

    /// Virtual time spent in `present` for `label`.
    pub fn duration_us(&self, label: ColorLabel) -> u64 {
        match self.pattern(label) {
            IndicatorPattern::Single(_) => 0,
            IndicatorPattern::BlinkAll => 2 * self.blink_ms as u64 * 1000,
        }
    }

    fn set_all<B: Board>(&self, board: &mut B, level: DigitalLevel) {
        for pin in self.indicators.all() {
            board.set_output(pin, level);
        }
    }
}
