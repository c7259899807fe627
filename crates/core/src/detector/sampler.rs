// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::{Channel, Illumination, ReflectionSample};
use crate::signals::DigitalLevel;
use crate::{Board, PinId, SensorError};
use ldrlab_config::{DetectorConfig, IlluminationPins};

/// Lights the target with each illumination LED in turn and averages the
/// sensor readings taken under it.
#[derive(Debug, Clone)]
pub struct Sampler {
    pins: IlluminationPins,
    channel: u8,
    settle_ms: u32,
    sample_count: u8,
    acquisition_us: u32,
    gap_us: u32,
    faults: Vec<SensorError>,
}

impl Sampler {
    pub fn new(config: &DetectorConfig, pins: &IlluminationPins) -> Self {
        Self {
            pins: pins.clone(),
            channel: config.adc_channel,
            settle_ms: config.settle_time_ms,
            sample_count: config.sample_count.max(1),
            acquisition_us: config.acquisition_time_us,
            gap_us: config.inter_sample_gap_us,
            faults: Vec::new(),
        }
    }

    /// One full pass: ambient, red, green, blue. Every illumination LED is
    /// off again when this returns.
    pub fn sample<B: Board>(&mut self, board: &mut B) -> ReflectionSample {
        let mut readings = [0u16; 4];
        for (slot, state) in readings.iter_mut().zip(Illumination::SEQUENCE) {
            self.illuminate(board, state);
            board.delay_ms(self.settle_ms);
            *slot = self.read_average(board);
            tracing::debug!("{:?}: {}", state, *slot);
        }
        self.illuminate(board, Illumination::None);

        ReflectionSample {
            ambient: readings[0],
            red: readings[1],
            green: readings[2],
            blue: readings[3],
        }
    }

    /// Sensor failures seen since the last call. Each one was counted as a
    /// zero reading.
    pub fn take_faults(&mut self) -> Vec<SensorError> {
        std::mem::take(&mut self.faults)
    }

    /// Virtual time spent in `sample`.
    pub fn duration_us(&self) -> u64 {
        let per_reading = self.acquisition_us as u64 + self.gap_us as u64;
        let per_state = self.settle_ms as u64 * 1000 + self.sample_count as u64 * per_reading;
        per_state * Illumination::SEQUENCE.len() as u64
    }

    fn pin(&self, channel: Channel) -> PinId {
        match channel {
            Channel::Red => self.pins.red,
            Channel::Green => self.pins.green,
            Channel::Blue => self.pins.blue,
        }
    }

    fn illuminate<B: Board>(&self, board: &mut B, state: Illumination) {
        for channel in Channel::ALL {
            let lit = state == Illumination::Lit(channel);
            board.set_output(self.pin(channel), DigitalLevel::from(lit));
        }
    }

    fn read_average<B: Board>(&mut self, board: &mut B) -> u16 {
        let mut sum: u32 = 0;
        for _ in 0..self.sample_count {
            board.delay_us(self.acquisition_us);
            match board.read_analog(self.channel) {
                Ok(value) => sum += value as u32,
                Err(e) => {
                    tracing::warn!("{}; using 0", e);
                    self.faults.push(e);
                }
            }
            board.delay_us(self.gap_us);
        }
        (sum / self.sample_count as u32) as u16
    }
}
