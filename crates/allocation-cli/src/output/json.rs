use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the envelope to stdout, newline-terminated.
pub fn print_json(value: &Value) {
    let mut out = io::stdout().lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value).map_err(io::Error::from).and_then(|_| writeln!(out)) {
        tracing::error!(error = %e, "failed to write JSON output");
    }
}
