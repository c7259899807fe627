// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{LedBank, LedMask, Program, ProgramKind};
use crate::Board;
use ldrlab_config::CounterConfig;

const SEVEN_BIT_MASK: u8 = 0x7F;

/// Binary up-counter shown on the bank, one step per cycle.
#[derive(Debug, Clone)]
pub struct Counter {
    bank: LedBank,
    step_ms: u32,
    mask: u8,
    value: u8,
}

impl Counter {
    pub fn new(config: &CounterConfig, bank: LedBank) -> Self {
        Self {
            bank,
            step_ms: config.step_ms,
            mask: if config.seven_bit { SEVEN_BIT_MASK } else { 0xFF },
            value: 0,
        }
    }

    /// Value shown by the next cycle.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl<B: Board> Program<B> for Counter {
    fn name(&self) -> &'static str {
        ProgramKind::Counter.name()
    }

    fn start(&mut self, board: &mut B) {
        self.value = 0;
        self.bank.show(board, LedMask::empty());
    }

    fn run_cycle(&mut self, board: &mut B) {
        self.bank
            .show(board, LedMask::from_bits_retain(self.value & self.mask));
        board.delay_ms(self.step_ms);
        self.value = self.value.wrapping_add(1) & self.mask;
    }
}
