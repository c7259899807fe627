// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod color;
pub mod detector;
pub mod hal;
pub mod metrics;
pub mod peripherals;
pub mod physics;
pub mod programs;
pub mod signals;
pub mod system;


pub use embedded_hal::delay::DelayNs;
pub use ldrlab_config::{PinId, Port};

use signals::DigitalLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("ADC conversion on channel {channel} did not complete")]
    Timeout { channel: u8 },
    #[error("ADC channel {channel} is not available")]
    ChannelOutOfRange { channel: u8 },
    #[error("ADC registers could not be accessed while reading channel {channel}")]
    RegisterAccess { channel: u8 },
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Access to unmapped register offset {0:#x}")]
    UnmappedRegister(u64),
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Drives named digital outputs. Writes never fail.
pub trait DigitalOutputs {
    fn set_output(&mut self, pin: PinId, level: DigitalLevel);

    fn set_high(&mut self, pin: PinId) {
        self.set_output(pin, DigitalLevel::High);
    }

    fn set_low(&mut self, pin: PinId) {
        self.set_output(pin, DigitalLevel::Low);
    }
}

/// Blocking analog-to-digital conversion on a multiplexer channel.
pub trait AnalogInput {
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError>;
}

impl<F> AnalogInput for F
where
    F: FnMut(u8) -> Result<u16, SensorError>,
{
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError> {
        self(channel)
    }
}

/// Everything a program needs from the platform: outputs, one analog input
/// and a blocking delay.
pub trait Board: DigitalOutputs + AnalogInput + DelayNs {}

impl<T: DigitalOutputs + AnalogInput + DelayNs> Board for T {}

/// Trait for observing detector activity in a modular way.
pub trait DetectorObserver: std::fmt::Debug + Send + Sync {
    fn on_cycle_start(&self, _cycle: u64) {}
    fn on_detection(&self, _detection: &color::Detection) {}
    fn on_sensor_error(&self, _error: &SensorError) {}
}
