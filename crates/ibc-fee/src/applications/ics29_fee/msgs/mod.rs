//! Messages users and relayers send to the fee middleware.

pub mod pay_packet;
pub mod pay_packet_async;
pub mod register_counterparty_payee;
pub mod register_payee;
