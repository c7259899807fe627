// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Glue between the board traits and `embedded-hal` drivers.

use crate::signals::DigitalLevel;
use crate::{AnalogInput, DelayNs, DigitalOutputs, PinId, SensorError};
use embedded_hal::digital::OutputPin;

/// Named `OutputPin`s. Driver errors are logged and dropped, since
/// `DigitalOutputs` writes cannot fail.
#[derive(Debug)]
pub struct HalOutputs<P: OutputPin> {
    pins: Vec<(PinId, P)>,
}

impl<P: OutputPin> Default for HalOutputs<P> {
    fn default() -> Self {
        Self { pins: Vec::new() }
    }
}

impl<P: OutputPin> HalOutputs<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pin` under `id`, replacing any earlier registration.
    pub fn with_pin(mut self, id: PinId, pin: P) -> Self {
        self.pins.retain(|(existing, _)| *existing != id);
        self.pins.push((id, pin));
        self
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Hands the drivers back, in registration order.
    pub fn into_pins(self) -> Vec<(PinId, P)> {
        self.pins
    }
}

impl<P: OutputPin> DigitalOutputs for HalOutputs<P> {
    fn set_output(&mut self, pin: PinId, level: DigitalLevel) {
        let Some((_, out)) = self.pins.iter_mut().find(|(id, _)| *id == pin) else {
            tracing::warn!("No output registered for {}", pin);
            return;
        };
        if let Err(e) = out.set_state(level.into()) {
            tracing::warn!("Failed to drive {}: {:?}", pin, e);
        }
    }
}

/// Board assembled from separate output, analog and delay drivers.
#[derive(Debug)]
pub struct HalBoard<O, A, D> {
    pub outputs: O,
    pub analog: A,
    pub delay: D,
}

impl<O, A, D> HalBoard<O, A, D>
where
    O: DigitalOutputs,
    A: AnalogInput,
    D: DelayNs,
{
    pub fn new(outputs: O, analog: A, delay: D) -> Self {
        Self {
            outputs,
            analog,
            delay,
        }
    }
}

impl<O: DigitalOutputs, A, D> DigitalOutputs for HalBoard<O, A, D> {
    fn set_output(&mut self, pin: PinId, level: DigitalLevel) {
        self.outputs.set_output(pin, level);
    }
}

impl<O, A: AnalogInput, D> AnalogInput for HalBoard<O, A, D> {
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError> {
        self.analog.read_analog(channel)
    }
}

impl<O, A, D: DelayNs> DelayNs for HalBoard<O, A, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorLabel;
    use crate::detector::ColorDetector;
    use crate::Port;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use ldrlab_config::LabConfig;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    struct FakePin {
        high: Rc<Cell<bool>>,
        broken: bool,
    }

    impl ErrorType for FakePin {
        type Error = ErrorKind;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high.set(true);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct CountingDelay {
        ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += ns as u64;
        }
    }

    #[test]
    fn test_outputs_drive_registered_pins() {
        let led = FakePin::default();
        let probe = led.high.clone();
        let broken = FakePin {
            broken: true,
            ..Default::default()
        };
        let mut outputs = HalOutputs::new()
            .with_pin(PinId::new(Port::B, 0), led)
            .with_pin(PinId::new(Port::B, 1), broken);
        assert_eq!(outputs.len(), 2);

        outputs.set_high(PinId::new(Port::B, 0));
        assert!(probe.get());
        outputs.set_low(PinId::new(Port::B, 0));
        assert!(!probe.get());

        // Neither a failing driver nor an unknown pin panics.
        outputs.set_high(PinId::new(Port::B, 1));
        outputs.set_high(PinId::new(Port::D, 5));

        // Re-registering RB0 moves it behind RB1 and drops the old driver.
        let pins = outputs
            .with_pin(PinId::new(Port::B, 0), FakePin::default())
            .into_pins();
        let ids: Vec<PinId> = pins.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![PinId::new(Port::B, 1), PinId::new(Port::B, 0)]);
        assert!(!pins[1].1.high.get());
    }

    #[test]
    fn test_detector_on_hal_board() {
        let config = LabConfig::default();
        let mut outputs = HalOutputs::new();
        let mut probes = Vec::new();
        for pin in config
            .pins
            .illumination
            .all()
            .into_iter()
            .chain(config.pins.indicators.all())
        {
            let fake = FakePin::default();
            probes.push((pin, fake.high.clone()));
            outputs = outputs.with_pin(pin, fake);
        }

        // Constant sensor: nothing reflects beyond ambient.
        let analog = |_channel: u8| -> Result<u16, SensorError> { Ok(300) };
        let mut board = HalBoard::new(outputs, analog, CountingDelay::default());

        let mut detector = ColorDetector::new(&config);
        let detection = detector.cycle(&mut board);
        assert_eq!(detection.label, ColorLabel::Black);

        let black = config.pins.indicators.black;
        for (pin, probe) in probes {
            assert_eq!(probe.get(), pin == black, "{}", pin);
        }
        assert_eq!(
            board.delay.ns / 1000,
            detector.cycle_budget_us(ColorLabel::Black)
        );
    }
}
