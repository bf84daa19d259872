//! Yandex Metrika upstream API integration.
//!
//! This module owns the resilient HTTP client and the date helpers shared by
//! every analytics tool.

pub mod client;
pub mod date;

pub use client::{MetrikaClient, Params, API_BASE};
pub use date::{default_date_range, validate_date};
