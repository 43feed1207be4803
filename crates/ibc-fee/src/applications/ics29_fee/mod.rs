//! The implementation of the ICS 29 fee payment [standard](https://github.com/cosmos/ibc/blob/main/spec/app/ics-029-fee-payment/README.md).
//! Enables an incentivization layer for relayers such that relayer operators are rewarded
//! for successfully relaying packets.
//!
//! The documentation for this module makes use of some terminology, which is defined below:
//! 1. Forward relayer: The relayer that submits the `recv_packet` message for a given packet.
//! 2. Reverse relayer: The relayer that submits the `ack_packet` message for a given packet.
//! 3. Timeout relayer: The relayer that submits the `timeout_packet` message for a given packet.
//!
//! Fees are escrowed in the module account when a user pays for a packet, and are moved out
//! of it exactly once: to the relayers (and back to the payer) when the packet is acknowledged
//! or times out, or back to the payer when the channel closes. If the escrow account is ever
//! found to hold less than what it owes, the module locks itself and every channel falls back
//! to behaving as if fees were disabled.

pub mod acknowledgement;
pub mod context;
pub mod error;
pub mod events;
pub mod fee;
pub mod handler;
pub mod keeper;
pub mod keys;
pub mod metadata;
pub mod middleware;
pub mod msgs;
pub mod packet_fee;

/// Name of the fee module, used for routing and as the escrow module account name.
pub const MODULE_NAME: &str = "feeibc";

/// The version tag wrapped around the application version of fee-enabled channels.
pub const VERSION: &str = "ics29-1";
