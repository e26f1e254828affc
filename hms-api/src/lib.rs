//! Core types and web API client for HMS hydrology/meteorology data jobs.
//!
//! A job is built from a [`query::Query`], submitted to obtain a job id,
//! polled until it reaches `SUCCESS` or `FAILURE`, and its data written out.

pub mod config;
pub mod error;
pub mod job;
pub mod persist;
pub mod query;
pub mod swagger;

#[cfg(feature = "api")]
pub mod client;
#[cfg(feature = "api")]
pub mod poll;

pub use error::{HmsError, Result};
