// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use ldrlab_core::signals::SignalTrace;
use ldrlab_core::PinId;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use vcd::{IdCode, TimescaleUnit, Value, Writer};

/// Writes `trace` as a VCD waveform with one 1-bit wire per pin, grouped by
/// port, timescale 1 us. Every pin starts low at time 0.
pub fn write_vcd(
    path: &Path,
    trace: &SignalTrace,
    pins: &[PinId],
    end_us: u64,
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create VCD {:?}", path))?;
    let mut buf = BufWriter::new(file);
    write_trace(&mut buf, trace, pins, end_us)?;
    buf.flush()?;
    Ok(())
}

pub fn write_trace<W: Write>(
    out: W,
    trace: &SignalTrace,
    pins: &[PinId],
    end_us: u64,
) -> anyhow::Result<()> {
    let mut pins = pins.to_vec();
    pins.sort();
    pins.dedup();

    let mut writer = Writer::new(out);
    writer.timescale(1, TimescaleUnit::US)?;
    writer.add_module("board")?;

    let mut ids: HashMap<PinId, IdCode> = HashMap::new();
    let mut current_port = None;
    for pin in &pins {
        if current_port != Some(pin.port) {
            if current_port.is_some() {
                writer.upscope()?;
            }
            writer.add_module(&format!("PORT{}", pin.port.letter()))?;
            current_port = Some(pin.port);
        }
        let id = writer.add_wire(1, &pin.to_string())?;
        ids.insert(*pin, id);
    }
    if current_port.is_some() {
        writer.upscope()?; // port
    }
    writer.upscope()?; // board
    writer.enddefinitions()?;

    writer.timestamp(0)?;
    for pin in &pins {
        writer.change_scalar(ids[pin], Value::V0)?;
    }

    let mut last_time = 0;
    for event in trace.events() {
        let Some(&id) = ids.get(&event.pin) else {
            continue;
        };
        if event.time_us != last_time {
            writer.timestamp(event.time_us)?;
            last_time = event.time_us;
        }
        let value = if event.level.is_high() {
            Value::V1
        } else {
            Value::V0
        };
        writer.change_scalar(id, value)?;
    }

    if end_us > last_time {
        writer.timestamp(end_us)?;
    }
    Ok(())
}
