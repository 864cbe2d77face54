//! Ports to the messaging client (transport in, messenger out).

pub mod port;
pub mod types;
