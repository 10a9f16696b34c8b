//! # zanbot-core
//!
//! Core types, traits, configuration, and error handling for the zanbot menu assistant.

pub mod config;
pub mod error;
pub mod language;
pub mod message;
pub mod session;
pub mod traits;
