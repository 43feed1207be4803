//! The minimal slice of IBC core the fee middleware is written against: host identifiers,
//! channel and packet types, and the ICS 26 module callback interface.

pub mod ics04_channel;
pub mod ics24_host;
pub mod ics26_routing;
