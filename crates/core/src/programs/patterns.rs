// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::{LedBank, LedMask, Program, ProgramKind};
use crate::Board;
use ldrlab_config::PatternsConfig;

/// Bit-output demo: a sequential walk, a shift left and back right, then a
/// separator flash.
#[derive(Debug, Clone)]
pub struct Patterns {
    bank: LedBank,
    config: PatternsConfig,
}

impl Patterns {
    pub fn new(config: &PatternsConfig, bank: LedBank) -> Self {
        Self {
            bank,
            config: config.clone(),
        }
    }

    /// Virtual time of one `run_cycle`.
    pub fn cycle_duration_us(&self) -> u64 {
        let c = &self.config;
        let steps = 3 * 8 * c.step_ms as u64;
        let pauses = 3 * c.section_pause_ms as u64;
        let separator = c.separator_blinks as u64 * 2 * c.separator_blink_ms as u64;
        (steps + pauses + separator + c.cycle_pause_ms as u64) * 1000
    }

    fn walk<B: Board>(&self, board: &mut B) {
        for bit in 0..8 {
            self.step(board, LedMask::single(bit));
        }
        self.bank.show(board, LedMask::empty());
        board.delay_ms(self.config.section_pause_ms);
    }

    fn shift<B: Board>(&self, board: &mut B) {
        let mut mask = LedMask::LED0.bits();
        for _ in 0..8 {
            self.step(board, LedMask::from_bits_retain(mask));
            mask <<= 1;
        }
        let mut mask = LedMask::LED7.bits();
        for _ in 0..8 {
            self.step(board, LedMask::from_bits_retain(mask));
            mask >>= 1;
        }
    }

    fn step<B: Board>(&self, board: &mut B, mask: LedMask) {
        self.bank.show(board, mask);
        board.delay_ms(self.config.step_ms);
    }
}

impl<B: Board> Program<B> for Patterns {
    fn name(&self) -> &'static str {
        ProgramKind::Patterns.name()
    }

    fn start(&mut self, board: &mut B) {
        let c = &self.config;
        self.bank
            .flash(board, c.intro_blinks, c.intro_blink_ms, c.intro_blink_ms);
        board.delay_ms(c.intro_pause_ms);
    }

    fn run_cycle(&mut self, board: &mut B) {
        tracing::debug!("Pattern: sequential");
        self.walk(board);
        board.delay_ms(self.config.section_pause_ms);

        tracing::debug!("Pattern: shift");
        self.shift(board);
        board.delay_ms(self.config.section_pause_ms);

        let c = &self.config;
        self.bank.flash(
            board,
            c.separator_blinks,
            c.separator_blink_ms,
            c.separator_blink_ms,
        );
        board.delay_ms(c.cycle_pause_ms);
    }
}
