use serde_json::{Map, Value};
use std::io;

use super::{cell, is_record_array};

/// Write output as CSV to stdout.
///
/// The first list of records in the result (positions, rows, deltas,
/// sectors) becomes the table; results without one fall back to a
/// two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match primary_records(result) {
                Some(records) => write_records(&mut wtr, records),
                None => write_fields(&mut wtr, result),
            },
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_records(&mut wtr, arr),
        _ => wtr.write_record([cell(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write CSV output");
    }
}

fn primary_records(result: &Map<String, Value>) -> Option<&[Value]> {
    result.values().find_map(|v| match v {
        Value::Array(items) if is_record_array(v) => Some(items.as_slice()),
        _ => None,
    })
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([cell(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        if let Value::Object(map) = item {
            wtr.write_record(headers.iter().map(|h| map.get(*h).map(cell).unwrap_or_default()))?;
        }
    }
    Ok(())
}
