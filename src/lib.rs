#![warn(clippy::all)]

pub mod config;
mod error;
pub mod recurse;
mod sequence;
mod source;
#[cfg(test)]
mod test_utils;

pub use error::{Result, StreamError};
pub use sequence::{concat_readers, SequenceReader};
pub use source::{check_window, IoSource, Source};

pub fn print_bytes(bytes: impl Into<f64>) -> String {
    let bytes = bytes.into();
    for (unit, scale) in [("GB", 1e9), ("MB", 1e6), ("kB", 1e3)] {
        if bytes >= scale {
            return format!("{:.2} {}", bytes / scale, unit);
        }
    }
    format!("{bytes} B")
}
