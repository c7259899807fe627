// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use ldrlab_config::DetectorConfig;
use ldrlab_core::color::{ColorLabel, CompensatedReflection, ReflectionSample};
use ldrlab_core::detector::{compensate, Classifier};
use proptest::prelude::*;

fn sample() -> impl Strategy<Value = ReflectionSample> {
    (0u16..=1023, 0u16..=1023, 0u16..=1023, 0u16..=1023).prop_map(
        |(ambient, red, green, blue)| ReflectionSample {
            ambient,
            red,
            green,
            blue,
        },
    )
}

/// Channel triples whose total stays below the default black threshold.
fn dim_reflection() -> impl Strategy<Value = (u16, u16, u16)> {
    (0u16..50)
        .prop_flat_map(|r| (Just(r), 0..50 - r))
        .prop_flat_map(|(r, g)| (Just(r), Just(g), 0..50 - r - g))
}

proptest! {
    #[test]
    fn test_compensation_never_exceeds_raw(s in sample()) {
        let c = compensate(s);
        prop_assert!(c.red <= s.red);
        prop_assert!(c.green <= s.green);
        prop_assert!(c.blue <= s.blue);
    }

    #[test]
    fn test_compensation_is_exact_above_ambient(s in sample()) {
        let c = compensate(s);
        for (raw, comp) in [(s.red, c.red), (s.green, c.green), (s.blue, c.blue)] {
            if raw > s.ambient {
                prop_assert_eq!(comp, raw - s.ambient);
            } else {
                prop_assert_eq!(comp, 0);
            }
        }
    }

    #[test]
    fn test_classify_is_deterministic(r in 0u16..=1023, g in 0u16..=1023, b in 0u16..=1023) {
        let classifier = Classifier::default();
        let c = CompensatedReflection::new(r, g, b);
        prop_assert_eq!(classifier.classify(c), classifier.classify(c));
    }

    #[test]
    fn test_dim_reflection_is_black((r, g, b) in dim_reflection()) {
        prop_assert!((r as u32 + g as u32 + b as u32) < 50);
        let c = CompensatedReflection::new(r, g, b);
        prop_assert_eq!(Classifier::default().classify(c), ColorLabel::Black);
    }

    #[test]
    fn test_bright_even_reflection_is_white(base in 101u16..900, dg in 0u16..30, db in 0u16..30) {
        prop_assume!(dg.abs_diff(db) < 30);
        let c = CompensatedReflection::new(base, base + dg, base + db);
        prop_assert_eq!(Classifier::default().classify(c), ColorLabel::White);
    }

    #[test]
    fn test_black_and_white_never_overlap(r in 0u16..=1023, g in 0u16..=1023, b in 0u16..=1023) {
        let label = Classifier::default().classify(CompensatedReflection::new(r, g, b));
        let total = r as u32 + g as u32 + b as u32;
        if label == ColorLabel::Black {
            prop_assert!(total < 50);
        }
        if label == ColorLabel::White {
            prop_assert!(r > 100 && g > 100 && b > 100);
        }
    }

    #[test]
    fn test_lone_strong_channel_is_primary(v in 51u16..=1023, rest in 0u16..=1023) {
        // A second channel at or below 0.7 x v is never high.
        let low = ((v as u32 * 7) / 10) as u16;
        let other = rest.min(low);
        let classifier = Classifier::new(&DetectorConfig::default());
        prop_assert_eq!(
            classifier.classify(CompensatedReflection::new(v, other, 0)),
            ColorLabel::Red
        );
        prop_assert_eq!(
            classifier.classify(CompensatedReflection::new(0, v, other)),
            ColorLabel::Green
        );
        prop_assert_eq!(
            classifier.classify(CompensatedReflection::new(other, 0, v)),
            ColorLabel::Blue
        );
    }
}
