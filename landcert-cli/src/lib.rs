//! LANDCERT command line front end.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
