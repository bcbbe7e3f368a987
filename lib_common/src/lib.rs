//! # lib_common
//!
//! Shared library behind the Finnhub dashboard and stream relay. Each folder
//! is a module behind a cargo feature of the same name; `full` (the default)
//! turns them all on.

#![forbid(unsafe_code)]

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "markets")]
pub mod markets;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "transforms")]
pub mod transforms;
