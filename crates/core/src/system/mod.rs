// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Host-side simulation of the PIC18 board.

pub mod board;
pub mod clock;

pub use board::SimBoard;
pub use clock::VirtualClock;
