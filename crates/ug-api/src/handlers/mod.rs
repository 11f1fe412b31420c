//! API request handlers

pub mod uploads;

pub use uploads::*;
