// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Analog world outside the chip, advanced by the board's virtual clock.

pub mod ldr;

pub use ldr::LdrModel;

/// Something whose state evolves with time, such as a sensor's response lag.
pub trait PhysicalModel: Send {
    /// Moves the model `dt_ns` nanoseconds forward.
    fn step(&mut self, dt_ns: u64);
}
