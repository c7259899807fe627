// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::{CompensatedReflection, ReflectionSample};

/// Removes the ambient baseline from each colored reading, clamping at zero.
pub fn compensate(sample: ReflectionSample) -> CompensatedReflection {
    CompensatedReflection {
        red: sample.red.saturating_sub(sample.ambient),
        green: sample.green.saturating_sub(sample.ambient),
        blue: sample.blue.saturating_sub(sample.ambient),
    }
}
