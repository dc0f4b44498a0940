//! Common test utilities and helpers
#![allow(dead_code)]

use pcqueue::queue::api::BoxError;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Handler recording every item it sees, plus the shared record
pub fn recording_handler<T: Send + 'static>(
) -> (impl Fn(T) -> Result<(), BoxError> + Send + Sync + 'static, Arc<Mutex<Vec<T>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = move |item: T| {
        sink.lock().unwrap().push(item);
        Ok(())
    };
    (handler, seen)
}

pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
