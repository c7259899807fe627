// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::Channel;
use crate::peripherals::adc::{self, Adc};
use crate::peripherals::gpio::{self, GpioPort};
use crate::peripherals::Peripheral;
use crate::physics::{LdrModel, PhysicalModel};
use crate::signals::{DigitalLevel, SignalTrace};
use crate::system::VirtualClock;
use crate::{AnalogInput, DelayNs, DigitalOutputs, PinId, Port, SensorError, SimResult};
use ldrlab_config::{LabConfig, MAX_ADC_CHANNEL};

/// PIC18 board on the host: five I/O ports, the ADC with the LDR divider on
/// one channel, and red/green/blue LEDs shining on the target.
///
/// Conversions are polled without advancing virtual time; only delays move
/// the clock, so a program's timing is exactly the sum of its waits.
#[derive(Debug)]
pub struct SimBoard {
    ports: [GpioPort; 5],
    adc: Adc,
    ldr: LdrModel,
    ldr_channel: u8,
    illumination: [(PinId, Channel); 3],
    clock: VirtualClock,
    trace: SignalTrace,
    max_polls: u32,
}

impl SimBoard {
    /// Board in the state the programs' init code leaves it: every
    /// configured pin a digital output driven low, the ADC on and
    /// right-justified.
    pub fn from_config(config: &LabConfig) -> SimResult<Self> {
        let pins = &config.pins;
        let illumination = [
            (pins.illumination.red, Channel::Red),
            (pins.illumination.green, Channel::Green),
            (pins.illumination.blue, Channel::Blue),
        ];
        let mut board = Self {
            ports: Port::ALL.map(GpioPort::new),
            adc: Adc::new(&config.adc),
            ldr: LdrModel::new(&config.scene, config.adc.adc_max()),
            ldr_channel: config.detector.adc_channel,
            illumination,
            clock: VirtualClock::new(),
            trace: SignalTrace::new(),
            max_polls: config.adc.max_polls,
        };

        let outputs = pins
            .illumination
            .all()
            .into_iter()
            .chain(pins.indicators.all())
            .chain(pins.led_bank.iter().copied());
        for pin in outputs {
            board.update_register(pin.port, gpio::ANSEL, |v| v & !pin.mask())?;
            board.update_register(pin.port, gpio::LAT, |v| v & !pin.mask())?;
            board.update_register(pin.port, gpio::TRIS, |v| v & !pin.mask())?;
        }

        board.adc.write(adc::ADCON2, adc::ADCON2_ADFM)?;
        board.adc.write(adc::ADCON0, adc::ADCON0_ADON)?;
        tracing::debug!(
            "Simulated board ready: LDR on AN{}, ADC max {}",
            board.ldr_channel,
            config.adc.adc_max()
        );
        Ok(board)
    }

    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    pub fn trace(&self) -> &SignalTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut SignalTrace {
        &mut self.trace
    }

    pub fn take_trace(&mut self) -> SignalTrace {
        let enabled = self.trace.is_enabled();
        std::mem::replace(
            &mut self.trace,
            if enabled {
                SignalTrace::new()
            } else {
                SignalTrace::disabled()
            },
        )
    }

    /// Level currently driven on `pin`; undriven pins read low.
    pub fn level(&self, pin: PinId) -> DigitalLevel {
        DigitalLevel::from(self.port(pin.port).output_levels() & pin.mask() != 0)
    }

    /// Driven levels of a whole port, bit 0 first.
    pub fn output_byte(&self, port: Port) -> u8 {
        self.port(port).output_levels()
    }

    pub fn port(&self, port: Port) -> &GpioPort {
        &self.ports[port.index()]
    }

    pub fn ldr(&self) -> &LdrModel {
        &self.ldr
    }

    pub fn ldr_mut(&mut self) -> &mut LdrModel {
        &mut self.ldr
    }

    pub fn adc(&self) -> &Adc {
        &self.adc
    }

    pub fn adc_mut(&mut self) -> &mut Adc {
        &mut self.adc
    }

    pub fn snapshot(&self) -> serde_json::Value {
        let ports: serde_json::Map<String, serde_json::Value> = self
            .ports
            .iter()
            .map(|p| (format!("PORT{}", p.port().letter()), p.snapshot()))
            .collect();
        serde_json::json!({
            "time_us": self.now_us(),
            "ports": ports,
            "adc": self.adc.snapshot(),
            "ldr": {
                "channel": self.ldr_channel,
                "level": self.ldr.level(),
                "illumination": self.ldr.illumination(),
            },
        })
    }

    fn update_register(
        &mut self,
        port: Port,
        offset: u64,
        f: impl FnOnce(u8) -> u8,
    ) -> SimResult<()> {
        let gpio = &mut self.ports[port.index()];
        let value = gpio.read(offset)?;
        gpio.write(offset, f(value))
    }

    fn sync_illumination(&mut self, pin: PinId) {
        let Some(&(_, channel)) = self.illumination.iter().find(|(p, _)| *p == pin) else {
            return;
        };
        let lit = self.level(pin).is_high();
        self.ldr.set_lit(channel, lit);
    }

    fn convert(&mut self, channel: u8) -> SimResult<Option<u16>> {
        let chs = (channel << adc::ADCON0_CHS_SHIFT) & adc::ADCON0_CHS_MASK;
        self.adc.write(adc::ADCON0, chs | adc::ADCON0_ADON)?;
        self.adc
            .write(adc::ADCON0, chs | adc::ADCON0_ADON | adc::ADCON0_GO)?;

        for _ in 0..self.max_polls {
            self.adc.tick();
            if self.adc.read(adc::ADCON0)? & adc::ADCON0_GO == 0 {
                let high = self.adc.read(adc::ADRESH)? as u16;
                let low = self.adc.read(adc::ADRESL)? as u16;
                return Ok(Some((high << 8) | low));
            }
        }

        // Abort so the next request starts a fresh conversion.
        self.adc.write(adc::ADCON0, chs)?;
        Ok(None)
    }
}

impl DigitalOutputs for SimBoard {
    fn set_output(&mut self, pin: PinId, level: DigitalLevel) {
        let before = self.level(pin);
        let result = self.update_register(pin.port, gpio::LAT, |v| match level {
            DigitalLevel::High => v | pin.mask(),
            DigitalLevel::Low => v & !pin.mask(),
        });
        if let Err(e) = result {
            tracing::error!("Failed to write {}: {}", pin, e);
            return;
        }
        if !self.port(pin.port).is_output(pin.bit) {
            tracing::warn!("{} is not configured as an output", pin);
        }

        let after = self.level(pin);
        if after != before {
            self.trace.record(self.now_us(), pin, after);
            self.sync_illumination(pin);
        }
    }
}

impl AnalogInput for SimBoard {
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError> {
        if channel > MAX_ADC_CHANNEL {
            return Err(SensorError::ChannelOutOfRange { channel });
        }
        let reading = if channel == self.ldr_channel {
            self.ldr.reading()
        } else {
            0
        };
        self.adc.set_channel_input(channel, reading);

        conversion_outcome(channel, self.convert(channel))
    }
}

fn conversion_outcome(channel: u8, outcome: SimResult<Option<u16>>) -> Result<u16, SensorError> {
    match outcome {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(SensorError::Timeout { channel }),
        Err(e) => {
            tracing::error!("ADC access failed: {}", e);
            Err(SensorError::RegisterAccess { channel })
        }
    }
}

impl DelayNs for SimBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(ns as u64);
        self.ldr.step(ns as u64);
    }
}
