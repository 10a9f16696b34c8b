//! # zanbot-channels
//!
//! Chat transport integrations for zanbot.

pub mod telegram;
