// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{Peripheral, PeripheralTickResult};
use crate::{SimResult, SimulationError};
use ldrlab_config::{AdcConfig, MAX_ADC_CHANNEL};

pub const ADCON0: u64 = 0x00;
pub const ADCON1: u64 = 0x01;
pub const ADCON2: u64 = 0x02;
pub const ADRESL: u64 = 0x03;
pub const ADRESH: u64 = 0x04;

pub const ADCON0_ADON: u8 = 1 << 0;
pub const ADCON0_GO: u8 = 1 << 1;
pub const ADCON0_CHS_SHIFT: u8 = 2;
pub const ADCON0_CHS_MASK: u8 = 0x1F << ADCON0_CHS_SHIFT;
pub const ADCON2_ADFM: u8 = 1 << 7;

const CHANNELS: usize = MAX_ADC_CHANNEL as usize + 1;

/// PIC18 successive-approximation ADC.
///
/// Setting GO/nDONE while ADON is set samples the selected channel; the
/// result lands in `ADRESH:ADRESL` and GO/nDONE clears `conversion_ticks`
/// ticks later. With ADFM set the result is right-justified.
#[derive(Debug, serde::Serialize)]
pub struct Adc {
    adcon0: u8,
    adcon1: u8,
    adcon2: u8,
    adresl: u8,
    adresh: u8,

    resolution_bits: u8,
    conversion_ticks: u32,
    stuck: bool,
    #[serde(skip)]
    inputs: [u16; CHANNELS],
    #[serde(skip)]
    pending: Option<(u16, u32)>,
}

impl Adc {
    pub fn new(config: &AdcConfig) -> Self {
        Self {
            adcon0: 0,
            adcon1: 0,
            adcon2: 0,
            adresl: 0,
            adresh: 0,
            resolution_bits: config.resolution_bits,
            conversion_ticks: config.conversion_ticks,
            stuck: config.stuck,
            inputs: [0; CHANNELS],
            pending: None,
        }
    }

    pub fn adc_max(&self) -> u16 {
        ((1u32 << self.resolution_bits) - 1) as u16
    }

    /// Analog level on `channel`, in converter counts.
    pub fn set_channel_input(&mut self, channel: u8, value: u16) {
        let max = self.adc_max();
        if let Some(slot) = self.inputs.get_mut(channel as usize) {
            *slot = value.min(max);
        }
    }

    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    pub fn is_busy(&self) -> bool {
        self.adcon0 & ADCON0_GO != 0
    }

    pub fn selected_channel(&self) -> u8 {
        (self.adcon0 & ADCON0_CHS_MASK) >> ADCON0_CHS_SHIFT
    }

    /// Last conversion result, honouring ADFM.
    pub fn result(&self) -> u16 {
        let raw = ((self.adresh as u16) << 8) | self.adresl as u16;
        if self.adcon2 & ADCON2_ADFM != 0 {
            raw
        } else {
            raw >> (16 - self.resolution_bits)
        }
    }

    fn start_conversion(&mut self) {
        let sampled = self
            .inputs
            .get(self.selected_channel() as usize)
            .copied()
            .unwrap_or(0);
        self.pending = Some((sampled, self.conversion_ticks));
    }

    fn store_result(&mut self, value: u16) {
        let aligned = if self.adcon2 & ADCON2_ADFM != 0 {
            value
        } else {
            value << (16 - self.resolution_bits)
        };
        self.adresh = (aligned >> 8) as u8;
        self.adresl = (aligned & 0xFF) as u8;
    }
}

impl Peripheral for Adc {
    fn read(&self, offset: u64) -> SimResult<u8> {
        match offset {
            ADCON0 => Ok(self.adcon0),
            ADCON1 => Ok(self.adcon1),
            ADCON2 => Ok(self.adcon2),
            ADRESL => Ok(self.adresl),
            ADRESH => Ok(self.adresh),
            _ => Err(SimulationError::UnmappedRegister(offset)),
        }
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        match offset {
            ADCON0 => {
                let was_busy = self.is_busy();
                self.adcon0 = value;
                if self.adcon0 & ADCON0_ADON == 0 {
                    // Turning the module off aborts any conversion.
                    self.adcon0 &= !ADCON0_GO;
                    self.pending = None;
                } else if self.is_busy() && !was_busy {
                    self.start_conversion();
                }
            }
            ADCON1 => self.adcon1 = value,
            ADCON2 => self.adcon2 = value,
            ADRESL => self.adresl = value,
            ADRESH => self.adresh = value,
            _ => return Err(SimulationError::UnmappedRegister(offset)),
        }
        Ok(())
    }

    fn tick(&mut self) -> PeripheralTickResult {
        let Some((value, remaining)) = self.pending else {
            return PeripheralTickResult::default();
        };
        if self.stuck {
            return PeripheralTickResult {
                cycles: 1,
                completed: false,
            };
        }

        if remaining > 1 {
            self.pending = Some((value, remaining - 1));
            return PeripheralTickResult {
                cycles: 1,
                completed: false,
            };
        }

        self.pending = None;
        self.store_result(value);
        self.adcon0 &= !ADCON0_GO;
        PeripheralTickResult {
            cycles: 1,
            completed: true,
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(adc: &mut Adc, channel: u8) {
        let chs = channel << ADCON0_CHS_SHIFT;
        adc.write(ADCON0, chs | ADCON0_ADON).unwrap();
        adc.write(ADCON0, chs | ADCON0_ADON | ADCON0_GO).unwrap();
    }

    #[test]
    fn test_adc_basic_conversion() {
        let mut adc = Adc::new(&AdcConfig::default());
        adc.write(ADCON2, ADCON2_ADFM).unwrap();
        adc.set_channel_input(0, 0x2A5);
        start(&mut adc, 0);
        assert!(adc.is_busy());

        for _ in 0..10 {
            let res = adc.tick();
            assert!(!res.completed);
            assert!(adc.is_busy());
        }

        let res = adc.tick();
        assert!(res.completed);
        assert!(!adc.is_busy());
        assert_eq!(adc.read(ADRESH).unwrap(), 0x02);
        assert_eq!(adc.read(ADRESL).unwrap(), 0xA5);
        assert_eq!(adc.result(), 0x2A5);
    }

    #[test]
    fn test_left_justified_result() {
        let mut adc = Adc::new(&AdcConfig::default());
        adc.set_channel_input(3, 0x3FF);
        start(&mut adc, 3);
        assert_eq!(adc.selected_channel(), 3);
        while adc.is_busy() {
            adc.tick();
        }
        assert_eq!(adc.read(ADRESH).unwrap(), 0xFF);
        assert_eq!(adc.read(ADRESL).unwrap(), 0xC0);
        assert_eq!(adc.result(), 0x3FF);
    }

    #[test]
    fn test_input_clamped_to_resolution() {
        let config = AdcConfig {
            resolution_bits: 8,
            ..AdcConfig::default()
        };
        let mut adc = Adc::new(&config);
        adc.write(ADCON2, ADCON2_ADFM).unwrap();
        adc.set_channel_input(0, 1000);
        start(&mut adc, 0);
        while adc.is_busy() {
            adc.tick();
        }
        assert_eq!(adc.result(), 255);
    }

    #[test]
    fn test_go_ignored_when_off() {
        let mut adc = Adc::new(&AdcConfig::default());
        adc.write(ADCON0, ADCON0_GO).unwrap();
        assert!(!adc.is_busy());
        assert!(!adc.tick().completed);
    }

    #[test]
    fn test_stuck_never_completes() {
        let mut adc = Adc::new(&AdcConfig::default());
        adc.set_stuck(true);
        start(&mut adc, 0);
        for _ in 0..10_000 {
            assert!(!adc.tick().completed);
        }
        assert!(adc.is_busy());

        // ADON off clears the stuck conversion.
        adc.write(ADCON0, 0).unwrap();
        assert!(!adc.is_busy());
    }

    #[test]
    fn test_unmapped_register() {
        let adc = Adc::new(&AdcConfig::default());
        assert!(adc.read(0x05).is_err());
    }
}
