#![no_std]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! This library implements the ICS 29 fee middleware of the InterBlockchain Communication (IBC)
//! protocol. The middleware sits between the IBC core handlers and an application module and
//! lets users escrow fees that are paid out to the relayers which deliver, acknowledge or time
//! out a packet.
//!
//! The layout of this crate mirrors the classification of the [Interchain
//! Standards][ics-standards]. `Core` holds the minimal transport types the middleware needs
//! (identifiers, packets, channel versions and the ICS 26 module callback interface), while
//! `Applications` holds the fee middleware itself.
//!
//! All fee state is kept in a byte-keyed, transactional [`store`]. Distribution of fees is
//! staged in a discardable overlay of that store, so a batch of payouts is either applied as a
//! whole or not at all.
//!
//! [ics-standards]: https://github.com/cosmos/ibc#interchain-standards

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod prelude;

pub mod applications;
pub mod coin;
pub mod core;
pub mod events;
pub mod handler;
pub mod signer;
pub mod store;
pub mod tx_msg;

mod serializers;

#[cfg(any(test, feature = "mocks"))]
pub mod test_utils;

#[cfg(any(test, feature = "mocks"))]
pub mod mock; // Mock host context and inner application, for testing the middleware end to end.
