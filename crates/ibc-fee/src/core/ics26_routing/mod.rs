//! ICS 26: Routing, the callback interface between IBC core and applications.

pub mod context;
