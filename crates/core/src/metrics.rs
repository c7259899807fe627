// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::color::{ColorLabel, Detection};
use crate::{DetectorObserver, SensorError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct DetectionMetrics {
    cycle_count: AtomicU64,
    detection_count: AtomicU64,
    sensor_fault_count: AtomicU64,
    labels: Mutex<HashMap<ColorLabel, u64>>,
}

/// Point-in-time copy of the counters, in `ColorLabel::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub cycles: u64,
    pub detections: u64,
    pub sensor_faults: u64,
    pub labels: Vec<(ColorLabel, u64)>,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.cycle_count.store(0, Ordering::SeqCst);
        self.detection_count.store(0, Ordering::SeqCst);
        self.sensor_fault_count.store(0, Ordering::SeqCst);
        if let Ok(mut m) = self.labels.lock() {
            m.clear();
        }
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycle_count.load(Ordering::SeqCst)
    }

    pub fn get_detections(&self) -> u64 {
        self.detection_count.load(Ordering::SeqCst)
    }

    pub fn get_sensor_faults(&self) -> u64 {
        self.sensor_fault_count.load(Ordering::SeqCst)
    }

    pub fn get_label_count(&self, label: ColorLabel) -> u64 {
        self.labels
            .lock()
            .ok()
            .and_then(|m| m.get(&label).copied())
            .unwrap_or(0)
    }

    pub fn summary(&self) -> MetricsSummary {
        let labels = ColorLabel::ALL
            .iter()
            .map(|&label| (label, self.get_label_count(label)))
            .filter(|(_, count)| *count > 0)
            .collect();
        MetricsSummary {
            cycles: self.get_cycles(),
            detections: self.get_detections(),
            sensor_faults: self.get_sensor_faults(),
            labels,
        }
    }
}

impl DetectorObserver for DetectionMetrics {
    fn on_cycle_start(&self, _cycle: u64) {
        self.cycle_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_detection(&self, detection: &Detection) {
        self.detection_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut m) = self.labels.lock() {
            *m.entry(detection.label).or_insert(0) += 1;
        }
    }

    fn on_sensor_error(&self, _error: &SensorError) {
        self.sensor_fault_count.fetch_add(1, Ordering::SeqCst);
    }
}
