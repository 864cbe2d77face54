//! Core of a rule-based chat bot: menu, auto-replies, a regex reply table
//! with a small learning memory, and the gateway that drives them.
//!
//! This crate is framework-agnostic. Messaging clients live behind the
//! `Transport` and `MessagingPort` traits, implemented in adapter crates.

pub mod auto_reply;
pub mod bot;
pub mod clock;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gateway;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod responder;
pub mod scheduler;
pub mod session;
pub mod utils;

pub use errors::{Error, Result};
