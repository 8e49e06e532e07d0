//! Canonical configuration model.
//!
//! `Server` and `Config` decode from a raw JSON object by pulling out the
//! keys they know and keeping the rest as an unknown-field bag. Encoding
//! starts from that bag and overlays the known fields, so fields added by
//! newer tools survive a read/write cycle.

mod config;
pub(crate) mod raw;
mod server;

pub use config::Config;
pub use server::{SUPPORTED_PLATFORMS, Server, Transport};
