//! Server-sent event decoding

use crate::error::{Result, TxAsmError};
use serde::de::DeserializeOwned;
use std::io::BufRead;
use std::marker::PhantomData;

/// Keep-alive payload sent when a stream opens
const HELLO: &str = "\"hello\"";

/// Iterator over the JSON records carried by an event stream.
///
/// Only `data:` fields are read; multi-line data is joined with `\n` and
/// dispatched on the blank line ending the event.
pub struct EventStream<T> {
    reader: Box<dyn BufRead + Send>,
    done: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> EventStream<T> {
    pub fn new(reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            reader,
            done: false,
            _record: PhantomData,
        }
    }

    /// Next event payload, `None` at end of stream
    fn next_data(&mut self) -> Result<Option<String>> {
        let mut data: Option<String> = None;
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                self.done = true;
                return Ok(data);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if data.is_some() {
                    return Ok(data);
                }
                continue;
            }
            if let Some(value) = line.strip_prefix("data:") {
                let value = value.strip_prefix(' ').unwrap_or(value);
                match data.as_mut() {
                    Some(buffer) => {
                        buffer.push('\n');
                        buffer.push_str(value);
                    }
                    None => data = Some(value.to_string()),
                }
            }
        }
    }
}

impl<T: DeserializeOwned> Iterator for EventStream<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let data = match self.next_data() {
                Ok(Some(data)) => data,
                Ok(None) => return None,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if data.trim() == HELLO {
                continue;
            }
            return Some(serde_json::from_str(&data).map_err(|e| {
                TxAsmError::DeserializationError(format!("bad event payload: {}", e))
            }));
        }
        None
    }
}
