// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::Peripheral;
use crate::{Port, SimResult, SimulationError};

pub const PORT: u64 = 0x00;
pub const LAT: u64 = 0x01;
pub const TRIS: u64 = 0x02;
pub const ANSEL: u64 = 0x03;

/// PIC18 8-bit I/O port.
///
/// A cleared `TRIS` bit makes the pin an output driven from `LAT`. Reading
/// `PORT` returns the driven level for outputs and the external level for
/// digital inputs; pins left analog in `ANSEL` read 0. Writing `PORT`
/// writes the latch, as on the real part.
#[derive(Debug, serde::Serialize)]
pub struct GpioPort {
    port: Port,
    lat: u8,
    tris: u8,
    ansel: u8,
    #[serde(skip)]
    external: u8,
}

impl GpioPort {
    pub fn new(port: Port) -> Self {
        // Reset state: every pin an analog input.
        Self {
            port,
            lat: 0x00,
            tris: 0xFF,
            ansel: 0xFF,
            external: 0x00,
        }
    }

    pub fn port(&self) -> Port {
        self.port
    }

    /// Levels currently driven onto the pins.
    pub fn output_levels(&self) -> u8 {
        self.lat & !self.tris
    }

    pub fn is_output(&self, bit: u8) -> bool {
        self.tris & (1 << bit) == 0
    }

    /// Level applied to the pins from outside the chip.
    pub fn set_external(&mut self, levels: u8) {
        self.external = levels;
    }

    fn read_port(&self) -> u8 {
        let digital_inputs = self.tris & !self.ansel;
        self.output_levels() | (self.external & digital_inputs)
    }
}

impl Peripheral for GpioPort {
    fn read(&self, offset: u64) -> SimResult<u8> {
        match offset {
            PORT => Ok(self.read_port()),
            LAT => Ok(self.lat),
            TRIS => Ok(self.tris),
            ANSEL => Ok(self.ansel),
            _ => Err(SimulationError::UnmappedRegister(offset)),
        }
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        match offset {
            PORT | LAT => self.lat = value,
            TRIS => self.tris = value,
            ANSEL => self.ansel = value,
            _ => return Err(SimulationError::UnmappedRegister(offset)),
        }
        Ok(())
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
