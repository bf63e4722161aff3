//! Purpose: Render stored records for the console, as text blocks or JSON lines.
//! Exports: `RecordFormat`, `write_records`, `record_json`.
//! Role: Pure formatting; reads the store through its iterator only.
//! Invariants: Records are written in insertion order, numbered from 1.
//! Invariants: JSON output is a blank line, then one compact object per line.
use std::io::{self, Write};

use clap::ValueEnum;
use partstore::api::{PartRecord, Reallocate, RecordStore};
use serde_json::{Map, Value, json};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordFormat {
    #[default]
    Human,
    Json,
}

pub(crate) fn write_records<W, R>(
    out: &mut W,
    store: &RecordStore<R>,
    format: RecordFormat,
) -> io::Result<()>
where
    W: Write,
    R: Reallocate,
{
    if store.is_empty() {
        writeln!(out, "\nNo records stored yet.")?;
        return Ok(());
    }
    match format {
        RecordFormat::Human => {
            writeln!(out, "\n--- All Records ---")?;
            for (index, record) in store.iter().enumerate() {
                write_record_human(out, index + 1, record)?;
            }
        }
        RecordFormat::Json => {
            writeln!(out)?;
            for (index, record) in store.iter().enumerate() {
                let line = serde_json::to_string(&record_json(index + 1, record))
                    .map_err(io::Error::other)?;
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

fn write_record_human<W: Write>(out: &mut W, number: usize, record: &PartRecord) -> io::Result<()> {
    writeln!(out, "\nRecord #{number}")?;
    writeln!(out, " Part number:     {}", record.part_number)?;
    writeln!(out, " Part name:       {}", record.part_name)?;
    writeln!(out, " Part size:       {:.2}", record.part_size)?;
    writeln!(out, " Size metric:     {}", record.size_metric)?;
    writeln!(out, " Part cost:       ${:.2}", record.part_cost)?;
    Ok(())
}

pub(crate) fn record_json(number: usize, record: &PartRecord) -> Value {
    let mut inner = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    inner.insert("record".to_string(), json!(number));
    Value::Object(inner)
}
