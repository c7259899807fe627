// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Reflected-light color detector.
//!
//! One cycle runs the pipeline `Sampler -> compensate -> Classifier ->
//! Presenter` and then waits out the inter-cycle delay:
//!
//! ```text
//! Idle -> Sampling(ambient) -> Sampling(red) -> Sampling(green)
//!      -> Sampling(blue) -> Compensating -> Classifying -> Presenting -> Idle
//! ```

pub mod classifier;
pub mod compensator;
pub mod presenter;
pub mod sampler;

pub use classifier::Classifier;
pub use compensator::compensate;
pub use presenter::{IndicatorPattern, Presenter};
pub use sampler::Sampler;

use crate::color::{ColorLabel, Detection};
use crate::{Board, DetectorObserver, PinId};
use ldrlab_config::{IndicatorPins, LabConfig};
use std::sync::Arc;

const STARTUP_ROUNDS: usize = 2;
const STARTUP_STEP_MS: u32 = 200;
const STARTUP_ALL_MS: u32 = 500;
const STARTUP_PAUSE_MS: u32 = 1000;

#[derive(Debug)]
pub struct ColorDetector {
    sampler: Sampler,
    classifier: Classifier,
    presenter: Presenter,
    indicators: IndicatorPins,
    cycle_delay_ms: u32,
    startup: bool,
    observers: Vec<Arc<dyn DetectorObserver>>,
    cycles: u64,
}

impl ColorDetector {
    pub fn new(config: &LabConfig) -> Self {
        let detector = &config.detector;
        Self {
            sampler: Sampler::new(detector, &config.pins.illumination),
            classifier: Classifier::new(detector),
            presenter: Presenter::new(detector, &config.pins.indicators),
            indicators: config.pins.indicators.clone(),
            cycle_delay_ms: detector.cycle_delay_ms,
            startup: detector.startup_sequence,
            observers: Vec::new(),
            cycles: 0,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn DetectorObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Start-up indicator sequence. Does nothing when disabled in config.
    pub fn start<B: Board>(&mut self, board: &mut B) {
        self.presenter.clear(board);
        if !self.startup {
            return;
        }
        tracing::info!("Running start-up sequence");

        let primaries = self.primary_indicators();
        for _ in 0..STARTUP_ROUNDS {
            for pin in primaries {
                board.set_high(pin);
                board.delay_ms(STARTUP_STEP_MS);
                board.set_low(pin);
            }
        }
        for pin in primaries {
            board.set_high(pin);
        }
        board.delay_ms(STARTUP_ALL_MS);
        for pin in primaries {
            board.set_low(pin);
        }
        board.delay_ms(STARTUP_PAUSE_MS);
    }

    /// One full pass of the pipeline followed by the inter-cycle delay.
    pub fn cycle<B: Board>(&mut self, board: &mut B) -> Detection {
        self.cycles += 1;
        for observer in &self.observers {
            observer.on_cycle_start(self.cycles);
        }

        let sample = self.sampler.sample(board);
        for fault in self.sampler.take_faults() {
            for observer in &self.observers {
                observer.on_sensor_error(&fault);
            }
        }

        let compensated = compensate(sample);
        let label = self.classifier.classify(compensated);
        self.presenter.present(board, label);

        let detection = Detection {
            cycle: self.cycles,
            sample,
            compensated,
            label,
        };
        tracing::info!(
            "Cycle {}: {} (r={} g={} b={}, ambient {})",
            detection.cycle,
            label,
            compensated.red,
            compensated.green,
            compensated.blue,
            sample.ambient
        );
        for observer in &self.observers {
            observer.on_detection(&detection);
        }

        board.delay_ms(self.cycle_delay_ms);
        detection
    }

    /// Exact virtual duration of one `cycle` that ends in `label`.
    pub fn cycle_budget_us(&self, label: ColorLabel) -> u64 {
        self.sampler.duration_us()
            + self.presenter.duration_us(label)
            + self.cycle_delay_ms as u64 * 1000
    }

    /// Exact virtual duration of `start`.
    pub fn startup_duration_us(&self) -> u64 {
        if !self.startup {
            return 0;
        }
        let steps = STARTUP_ROUNDS as u64 * 3 * STARTUP_STEP_MS as u64;
        (steps + STARTUP_ALL_MS as u64 + STARTUP_PAUSE_MS as u64) * 1000
    }

    fn primary_indicators(&self) -> [PinId; 3] {
        [
            self.indicators.red,
            self.indicators.green,
            self.indicators.blue,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_components() {
        let detector = ColorDetector::new(&LabConfig::default());
        assert_eq!(detector.cycle_budget_us(ColorLabel::Red), 204_800 + 1_000_000);
        assert_eq!(
            detector.cycle_budget_us(ColorLabel::Undefined),
            204_800 + 1_000_000 + 1_000_000
        );
        assert_eq!(detector.startup_duration_us(), 2_700_000);
    }

    #[test]
    fn test_startup_can_be_disabled() {
        let mut config = LabConfig::default();
        config.detector.startup_sequence = false;
        let detector = ColorDetector::new(&config);
        assert_eq!(detector.startup_duration_us(), 0);
        assert_eq!(detector.cycles(), 0);
    }
}
