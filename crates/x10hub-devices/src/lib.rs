//! X10 shutter covers over a mochad controller.
//!
//! This crate exposes X10 shutter modules as cover entities with a small,
//! host-agnostic contract: report a 0-100 position, open, close, and move to
//! a position.
//!
//! ## Architecture
//!
//! - **MochadController**: TCP link to the mochad daemon plus the
//!   [`RequestLock`] that serializes all traffic on that link
//! - **MochadDevice**: per-address protocol handle (`pl a1 on`, status lookup)
//! - **MochadCover**: the cover entity; tracks position optimistically
//! - **setup_platform**: builds one cover per configured device
//!
//! Covers sharing a controller share its lock, so at most one request is in
//! flight on the link at any time.

pub mod address;
pub mod config;
pub mod controller;
pub mod cover;
pub mod device;
pub mod error;
pub mod platform;
pub mod position;

pub use address::{CommMode, X10Address};
pub use config::{CoverConfig, MochadConfig, X10HubConfig};
pub use controller::{MochadController, MochadTransport, RequestLock, TcpTransport};
pub use cover::{CoverEntity, CoverFeature, MochadCover, MOCHAD_COVER_FEATURES};
pub use device::{MochadDevice, X10Device};
pub use error::{X10Error, X10Result};
pub use platform::{MochadHub, setup_platform};
pub use position::CoverPosition;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
