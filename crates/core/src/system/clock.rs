// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::DelayNs;

/// Virtual time. Delays return immediately and only move the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    now_ns: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    pub fn now_us(&self) -> u64 {
        self.now_ns / 1000
    }

    pub fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
    }
}

impl DelayNs for VirtualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns as u64);
    }
}
