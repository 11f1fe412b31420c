//! Destination file names
//!
//! Names are `{timestamp}_{token}{extension}`: local time with separators
//! stripped, the first four characters of a v4 UUID, and the original
//! extension. Uniqueness is probabilistic; nothing checks the remote side.

use chrono::{DateTime, Local};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
const TOKEN_LEN: usize = 4;

/// Generate a unique destination name for `file_name`
pub fn generate_unique_name(file_name: &str) -> String {
    unique_name_at(file_name, Local::now())
}

/// Generate a destination name using the given clock reading
pub fn unique_name_at(file_name: &str, now: DateTime<Local>) -> String {
    let stamp: String = now
        .format(TIMESTAMP_FORMAT)
        .to_string()
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | ':'))
        .collect();

    let uuid = Uuid::new_v4().to_string();
    let token = &uuid[..TOKEN_LEN];

    format!("{}_{}{}", stamp, token, file_extension(file_name))
}

/// Extension of `file_name` including the leading dot, casing preserved.
///
/// Everything from the last `.` of the final path component, so `.png` is
/// its own extension. Returns an empty string when there is no extension.
pub fn file_extension(file_name: &str) -> String {
    let last = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file_name);
    match last.rfind('.') {
        Some(dot) if dot + 1 < last.len() => last[dot..].to_string(),
        _ => String::new(),
    }
}
