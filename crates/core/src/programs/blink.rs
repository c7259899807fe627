// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{LedBank, LedMask, Program, ProgramKind};
use crate::Board;
use ldrlab_config::BlinkConfig;

/// Every LED of the bank on, then off.
#[derive(Debug, Clone)]
pub struct Blink {
    bank: LedBank,
    on_ms: u32,
    off_ms: u32,
}

impl Blink {
    pub fn new(config: &BlinkConfig, bank: LedBank) -> Self {
        Self {
            bank,
            on_ms: config.on_ms,
            off_ms: config.off_ms,
        }
    }

    pub fn period_us(&self) -> u64 {
        (self.on_ms as u64 + self.off_ms as u64) * 1000
    }
}

impl<B: Board> Program<B> for Blink {
    fn name(&self) -> &'static str {
        ProgramKind::Blink.name()
    }

    fn start(&mut self, board: &mut B) {
        self.bank.show(board, LedMask::empty());
    }

    fn run_cycle(&mut self, board: &mut B) {
        self.bank.flash(board, 1, self.on_ms, self.off_ms);
    }
}
