// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::PinId;
use embedded_hal::digital::PinState;

/// Represents a digital signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitalLevel {
    #[default]
    Low,
    High,
}

impl DigitalLevel {
    pub fn is_high(self) -> bool {
        self == DigitalLevel::High
    }
}

impl From<bool> for DigitalLevel {
    fn from(b: bool) -> Self {
        if b {
            DigitalLevel::High
        } else {
            DigitalLevel::Low
        }
    }
}

impl From<DigitalLevel> for bool {
    fn from(level: DigitalLevel) -> Self {
        match level {
            DigitalLevel::High => true,
            DigitalLevel::Low => false,
        }
    }
}

impl From<DigitalLevel> for PinState {
    fn from(level: DigitalLevel) -> Self {
        match level {
            DigitalLevel::High => PinState::High,
            DigitalLevel::Low => PinState::Low,
        }
    }
}

/// One output transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SignalEvent {
    pub time_us: u64,
    pub pin: PinId,
    pub level: DigitalLevel,
}

/// Time-ordered record of every output level change on a board.
#[derive(Debug, Clone, Default)]
pub struct SignalTrace {
    events: Vec<SignalEvent>,
    enabled: bool,
}

impl SignalTrace {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, time_us: u64, pin: PinId, level: DigitalLevel) {
        if self.enabled {
            self.events.push(SignalEvent {
                time_us,
                pin,
                level,
            });
        }
    }

    pub fn events(&self) -> &[SignalEvent] {
        &self.events
    }

    pub fn events_for(&self, pin: PinId) -> impl Iterator<Item = &SignalEvent> {
        self.events.iter().filter(move |e| e.pin == pin)
    }

    /// Number of rising edges seen on `pin`.
    pub fn pulses(&self, pin: PinId) -> usize {
        self.events_for(pin).filter(|e| e.level.is_high()).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
