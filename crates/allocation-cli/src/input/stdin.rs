use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Piped JSON on stdin, parsed straight into the command's input type.
///
/// `None` when stdin is a terminal or the pipe is empty, so the caller can
/// fall through to its next input source.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let body = buffer.trim();
    if body.is_empty() {
        return Ok(None);
    }

    tracing::debug!(bytes = body.len(), "reading input from stdin");
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| format!("Failed to parse JSON from stdin: {}", e).into())
}
