//! # ug-core
//!
//! Core types and utilities for Upload Gateway.
//!
//! This crate provides the building blocks shared by the other crates:
//! - The upload error taxonomy
//! - The `Outcome` response envelope
//! - Configuration types and loading

pub mod config;
pub mod error;
pub mod result;

pub use error::*;
pub use result::*;
