// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::Serialize;
use std::fmt;

/// Result of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorLabel {
    /// Enough light came back but no rule matched. Rendered as a slow blink.
    Undefined,
    Red,
    Green,
    Blue,
    /// Reflects red and green well.
    Yellow,
    /// Reflects green and blue well.
    Cyan,
    /// Reflects red and blue well.
    Magenta,
    /// Reflects every color well and evenly.
    White,
    /// Reflects almost nothing.
    Black,
}

impl ColorLabel {
    pub const ALL: [ColorLabel; 9] = [
        ColorLabel::Undefined,
        ColorLabel::Red,
        ColorLabel::Green,
        ColorLabel::Blue,
        ColorLabel::Yellow,
        ColorLabel::Cyan,
        ColorLabel::Magenta,
        ColorLabel::White,
        ColorLabel::Black,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorLabel::Undefined => "undefined",
            ColorLabel::Red => "red",
            ColorLabel::Green => "green",
            ColorLabel::Blue => "blue",
            ColorLabel::Yellow => "yellow",
            ColorLabel::Cyan => "cyan",
            ColorLabel::Magenta => "magenta",
            ColorLabel::White => "white",
            ColorLabel::Black => "black",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Channel> for ColorLabel {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Red => ColorLabel::Red,
            Channel::Green => ColorLabel::Green,
            Channel::Blue => ColorLabel::Blue,
        }
    }
}

/// One of the three illumination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// Illumination state during sampling. `None` measures the ambient baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Illumination {
    None,
    Lit(Channel),
}

impl Illumination {
    /// Sampling order: ambient first, then red, green, blue.
    pub const SEQUENCE: [Illumination; 4] = [
        Illumination::None,
        Illumination::Lit(Channel::Red),
        Illumination::Lit(Channel::Green),
        Illumination::Lit(Channel::Blue),
    ];
}

/// Raw averaged readings of one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReflectionSample {
    pub ambient: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Readings with the ambient baseline removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompensatedReflection {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl CompensatedReflection {
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    pub fn get(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    pub fn total(&self) -> u32 {
        self.red as u32 + self.green as u32 + self.blue as u32
    }

    /// Largest absolute difference between any two channels.
    pub fn max_difference(&self) -> u16 {
        let rg = self.red.abs_diff(self.green);
        let rb = self.red.abs_diff(self.blue);
        let gb = self.green.abs_diff(self.blue);
        rg.max(rb).max(gb)
    }

    /// Channel with the greatest value. Ties go to red, then green.
    pub fn dominant(&self) -> (Channel, u16) {
        let mut best = (Channel::Red, self.red);
        if self.green > best.1 {
            best = (Channel::Green, self.green);
        }
        if self.blue > best.1 {
            best = (Channel::Blue, self.blue);
        }
        best
    }
}

/// Everything produced by one detector cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub cycle: u64,
    pub sample: ReflectionSample,
    pub compensated: CompensatedReflection,
    pub label: ColorLabel,
}
