// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::{Channel, ColorLabel, CompensatedReflection};
use ldrlab_config::{DetectorConfig, RATIO_SCALE};

/// Threshold and ratio rules mapping compensated reflections to a color.
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. total reflection below `min_threshold` is black;
/// 2. when every channel exceeds twice `min_threshold` and no two channels
///    differ by `min_difference` or more, the target is white;
/// 3. channels above `ratio × dominant` are *high*; two high channels give a
///    secondary color, red+green before green+blue before red+blue;
/// 4. a dominant channel above `min_threshold` gives its primary color;
/// 5. anything else is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    min_threshold: u32,
    min_difference: u16,
    ratio_ppm: u32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            min_threshold: config.min_threshold as u32,
            min_difference: config.min_difference,
            ratio_ppm: config.high_ratio_ppm(),
        }
    }

    pub fn classify(&self, c: CompensatedReflection) -> ColorLabel {
        if c.total() < self.min_threshold {
            return ColorLabel::Black;
        }

        let bright = self.min_threshold * 2;
        let all_bright = Channel::ALL.iter().all(|&ch| c.get(ch) as u32 > bright);
        if all_bright && c.max_difference() < self.min_difference {
            return ColorLabel::White;
        }

        let (dominant, max) = c.dominant();
        let high = |ch: Channel| self.is_high(c.get(ch), max);
        let high_count = Channel::ALL.iter().filter(|&&ch| high(ch)).count();

        if high_count >= 2 {
            if high(Channel::Red) && high(Channel::Green) {
                return ColorLabel::Yellow;
            }
            if high(Channel::Green) && high(Channel::Blue) {
                return ColorLabel::Cyan;
            }
            if high(Channel::Red) && high(Channel::Blue) {
                return ColorLabel::Magenta;
            }
        }

        if max as u32 > self.min_threshold {
            return dominant.into();
        }

        ColorLabel::Undefined
    }

    // value > ratio * max, cross-multiplied so no fraction is ever truncated.
    fn is_high(&self, value: u16, max: u16) -> bool {
        value as u64 * RATIO_SCALE as u64 > max as u64 * self.ratio_ppm as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(r: u16, g: u16, b: u16) -> ColorLabel {
        Classifier::default().classify(CompensatedReflection::new(r, g, b))
    }

    #[test]
    fn test_black_when_nothing_reflects() {
        assert_eq!(classify(0, 0, 0), ColorLabel::Black);
        assert_eq!(classify(20, 20, 9), ColorLabel::Black);
        // Sum of exactly the threshold is no longer black.
        assert_ne!(classify(20, 20, 10), ColorLabel::Black);
    }

    #[test]
    fn test_white_when_bright_and_even() {
        assert_eq!(classify(300, 300, 300), ColorLabel::White);
        assert_eq!(classify(200, 180, 190), ColorLabel::White);
    }

    #[test]
    fn test_white_needs_every_channel_bright() {
        // 100 is not above 2 x 50, so the white rule is skipped and the
        // even reflections fall through to the secondary-color rule.
        assert_eq!(classify(100, 120, 120), ColorLabel::Yellow);
    }

    #[test]
    fn test_bright_but_uneven_is_not_white() {
        // Every channel is high, difference 40 >= 30: red+green wins.
        assert_eq!(classify(240, 200, 220), ColorLabel::Yellow);
    }

    #[test]
    fn test_primary_colors() {
        assert_eq!(classify(200, 10, 10), ColorLabel::Red);
        assert_eq!(classify(10, 200, 10), ColorLabel::Green);
        assert_eq!(classify(10, 10, 200), ColorLabel::Blue);
    }

    #[test]
    fn test_secondary_colors() {
        assert_eq!(classify(200, 180, 10), ColorLabel::Yellow);
        assert_eq!(classify(10, 180, 200), ColorLabel::Cyan);
        assert_eq!(classify(200, 10, 180), ColorLabel::Magenta);
    }

    #[test]
    fn test_high_component_boundary_is_strict() {
        // 0.7 x 200 = 140 exactly: not high.
        assert_eq!(classify(200, 140, 10), ColorLabel::Red);
        assert_eq!(classify(200, 141, 10), ColorLabel::Yellow);
    }

    #[test]
    fn test_ratio_has_no_truncation_bias() {
        // 0.7 x 209 = 146.3. Computing 209 / 10 * 7 would put the cut at 140.
        assert_eq!(classify(209, 141, 10), ColorLabel::Red);
        assert_eq!(classify(209, 146, 10), ColorLabel::Red);
        assert_eq!(classify(209, 147, 10), ColorLabel::Yellow);
    }

    #[test]
    fn test_fine_ratio_is_honoured() {
        let with_ratio = |ratio: f32| {
            Classifier::new(&DetectorConfig {
                high_component_ratio: ratio,
                ..DetectorConfig::default()
            })
        };

        // 0.9996 x 1000 = 999.6, so an equal green channel is high.
        let near_one = with_ratio(0.9996);
        assert_eq!(
            near_one.classify(CompensatedReflection::new(1000, 1000, 0)),
            ColorLabel::Yellow
        );
        assert_eq!(
            near_one.classify(CompensatedReflection::new(1000, 999, 0)),
            ColorLabel::Red
        );

        // 0.7004 x 4095 = 2868.138 on a 12-bit converter.
        let fine = with_ratio(0.7004);
        assert_eq!(
            fine.classify(CompensatedReflection::new(4095, 2868, 0)),
            ColorLabel::Red
        );
        assert_eq!(
            fine.classify(CompensatedReflection::new(4095, 2869, 0)),
            ColorLabel::Yellow
        );
    }

    #[test]
    fn test_undefined_when_dim_and_single_channel() {
        assert_eq!(classify(40, 10, 10), ColorLabel::Undefined);
        // Dominant exactly at the threshold is not enough either.
        assert_eq!(classify(50, 10, 0), ColorLabel::Undefined);
    }

    #[test]
    fn test_dim_but_balanced_reads_as_secondary() {
        assert_eq!(classify(30, 30, 0), ColorLabel::Yellow);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = DetectorConfig {
            min_threshold: 100,
            min_difference: 10,
            high_component_ratio: 0.5,
            ..DetectorConfig::default()
        };
        let classifier = Classifier::new(&config);
        assert_eq!(
            classifier.classify(CompensatedReflection::new(30, 30, 30)),
            ColorLabel::Black
        );
        assert_eq!(
            classifier.classify(CompensatedReflection::new(300, 160, 10)),
            ColorLabel::Yellow
        );
        assert_eq!(
            classifier.classify(CompensatedReflection::new(300, 150, 10)),
            ColorLabel::Red
        );
    }

    #[test]
    fn test_classify_is_repeatable() {
        let classifier = Classifier::default();
        let c = CompensatedReflection::new(200, 180, 190);
        let first = classifier.classify(c);
        for _ in 0..10 {
            assert_eq!(classifier.classify(c), first);
        }
    }
}
