//! Data fetching and storage
//!
//! Handles:
//! - Yahoo Finance API for spot, expirations, call chains and the T-bill rate
//! - Local caching with per-kind time-to-live

pub mod cache;
pub mod yahoo;

pub use cache::*;
pub use yahoo::*;
