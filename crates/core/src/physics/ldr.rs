// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::PhysicalModel;
use crate::color::Channel;
use ldrlab_config::{Reflectance, SceneConfig};

/// Light-dependent resistor in a divider feeding the ADC.
///
/// The steady-state reading is the ambient level plus, for each lit
/// illumination LED, its intensity scaled by the target's reflectance for
/// that color. The actual reading approaches it with a first-order lag.
#[derive(Debug, Clone)]
pub struct LdrModel {
    ambient: f64,
    intensity: [f64; 3],
    reflectance: [f64; 3],
    tau_ns: f64,
    adc_max: u16,
    lit: [bool; 3],
    level: f64,
}

impl LdrModel {
    pub fn new(scene: &SceneConfig, adc_max: u16) -> Self {
        let leds = &scene.led_intensity;
        let mut model = Self {
            ambient: scene.ambient as f64,
            intensity: [leds.red as f64, leds.green as f64, leds.blue as f64],
            reflectance: [0.0; 3],
            tau_ns: scene.response_time_ms as f64 * 1e6,
            adc_max,
            lit: [false; 3],
            level: 0.0,
        };
        model.set_target(scene.target.reflectance());
        model.level = model.target_level();
        model
    }

    pub fn set_target(&mut self, target: Reflectance) {
        self.reflectance = [target.red as f64, target.green as f64, target.blue as f64];
        self.follow_if_instant();
    }

    pub fn set_ambient(&mut self, ambient: u16) {
        self.ambient = ambient as f64;
        self.follow_if_instant();
    }

    /// Which illumination LEDs shine on the target, red, green, blue.
    pub fn set_illumination(&mut self, lit: [bool; 3]) {
        self.lit = lit;
        self.follow_if_instant();
    }

    pub fn set_lit(&mut self, channel: Channel, lit: bool) {
        let mut state = self.lit;
        state[channel_index(channel)] = lit;
        self.set_illumination(state);
    }

    pub fn illumination(&self) -> [bool; 3] {
        self.lit
    }

    /// Level the sensor settles to under the current illumination.
    pub fn target_level(&self) -> f64 {
        let reflected: f64 = (0..3)
            .filter(|&i| self.lit[i])
            .map(|i| self.intensity[i] * self.reflectance[i])
            .sum();
        (self.ambient + reflected).min(self.adc_max as f64)
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Current level as a converter reading.
    pub fn reading(&self) -> u16 {
        self.level.round().clamp(0.0, self.adc_max as f64) as u16
    }

    fn follow_if_instant(&mut self) {
        if self.tau_ns <= 0.0 {
            self.level = self.target_level();
        }
    }
}

impl PhysicalModel for LdrModel {
    fn step(&mut self, dt_ns: u64) {
        let target = self.target_level();
        if self.tau_ns <= 0.0 {
            self.level = target;
            return;
        }
        let alpha = 1.0 - (-(dt_ns as f64) / self.tau_ns).exp();
        self.level += (target - self.level) * alpha;
    }
}

fn channel_index(channel: Channel) -> usize {
    match channel {
        Channel::Red => 0,
        Channel::Green => 1,
        Channel::Blue => 2,
    }
}
