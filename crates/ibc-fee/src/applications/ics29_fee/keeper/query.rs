//! Read-only views over the fee state, as served to clients.

use super::channel::{FeeEnabledChannel, FeeEnabledStore};
use super::escrow::EscrowStore;
use super::payee::PayeeRegistry;
use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::packet_fee::{IdentifiedPacketFees, PacketFees};
use crate::coin::Coins;
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::store::KvStore;

pub fn incentivized_packet<S: KvStore + ?Sized>(
    store: &S,
    packet_id: &PacketId,
) -> Result<Option<IdentifiedPacketFees>, Error> {
    Ok(store
        .get_fees_in_escrow(packet_id)?
        .map(|fees| IdentifiedPacketFees {
            packet_id: packet_id.clone(),
            packet_fees: fees.packet_fees,
        }))
}

pub fn incentivized_packets<S: KvStore + ?Sized>(
    store: &S,
) -> Result<Vec<IdentifiedPacketFees>, Error> {
    store.all_fees_in_escrow()
}

pub fn incentivized_packets_for_channel<S: KvStore + ?Sized>(
    store: &S,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Vec<IdentifiedPacketFees>, Error> {
    store.fees_in_escrow_for_channel(port_id, channel_id)
}

fn total_fees<S, F>(store: &S, packet_id: &PacketId, sum: F) -> Result<Option<Coins>, Error>
where
    S: KvStore + ?Sized,
    F: FnOnce(&PacketFees) -> Result<Coins, Error>,
{
    store
        .get_fees_in_escrow(packet_id)?
        .as_ref()
        .map(sum)
        .transpose()
}

/// Sum of the recv fees escrowed for a packet, `None` if nothing is escrowed for it.
pub fn total_recv_fees<S: KvStore + ?Sized>(
    store: &S,
    packet_id: &PacketId,
) -> Result<Option<Coins>, Error> {
    total_fees(store, packet_id, PacketFees::total_recv_fees)
}

pub fn total_ack_fees<S: KvStore + ?Sized>(
    store: &S,
    packet_id: &PacketId,
) -> Result<Option<Coins>, Error> {
    total_fees(store, packet_id, PacketFees::total_ack_fees)
}

pub fn total_timeout_fees<S: KvStore + ?Sized>(
    store: &S,
    packet_id: &PacketId,
) -> Result<Option<Coins>, Error> {
    total_fees(store, packet_id, PacketFees::total_timeout_fees)
}

pub fn payee<S: KvStore + ?Sized>(
    store: &S,
    relayer: &str,
    channel_id: &ChannelId,
) -> Result<Option<String>, Error> {
    store.get_payee_address(relayer, channel_id)
}

pub fn counterparty_payee<S: KvStore + ?Sized>(
    store: &S,
    relayer: &str,
    channel_id: &ChannelId,
) -> Result<Option<String>, Error> {
    store.get_counterparty_payee_address(relayer, channel_id)
}

pub fn fee_enabled_channels<S: KvStore + ?Sized>(
    store: &S,
) -> Result<Vec<FeeEnabledChannel>, Error> {
    store.fee_enabled_channels()
}

/// Whether the channel negotiated the fee version.
pub fn fee_enabled_channel<S: KvStore + ?Sized>(
    store: &S,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> bool {
    store.is_fee_enabled(port_id, channel_id)
}
