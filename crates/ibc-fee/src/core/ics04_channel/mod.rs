//! ICS 04: Channel and packet types consumed by the fee middleware.

pub mod acknowledgement;
pub mod channel;
pub mod context;
pub mod error;
pub mod packet;
pub mod version;

pub use version::Version;
