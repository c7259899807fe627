// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register-level models of the on-chip peripherals the programs touch.

pub mod adc;
pub mod gpio;

pub use adc::Adc;
pub use gpio::GpioPort;

use crate::SimResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralTickResult {
    /// Ticks spent doing work.
    pub cycles: u32,
    /// An operation (such as a conversion) finished during this tick.
    pub completed: bool,
}

/// Byte-addressed special function registers of one peripheral.
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&self, offset: u64) -> SimResult<u8>;
    fn write(&mut self, offset: u64, value: u8) -> SimResult<()>;
    fn tick(&mut self) -> PeripheralTickResult {
        PeripheralTickResult::default()
    }
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
