use tracing::{debug, error, warn};

use super::escrow::EscrowStore;
use super::lock::LockController;
use super::staged;
use crate::applications::ics29_fee::context::{resolve_account, FeeContext};
use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::events::DistributeFeeEvent;
use crate::applications::ics29_fee::packet_fee::{IdentifiedPacketFees, PacketFee, PacketFees};
use crate::coin::Coins;
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::ModuleOutputBuilder;
use crate::prelude::*;

/// How a staged batch of payouts ended.
enum Batch {
    Applied(Vec<DistributeFeeEvent>),
    /// The escrow account could not cover a fee of the batch.
    Underfunded,
}

/// Pays out the fees escrowed for an acknowledged packet: the recv fee to the forward
/// relayer, the ack fee to the reverse relayer, and the timeout fee back to the refund
/// address of each fee.
///
/// If the escrow account cannot cover the fees, no payout of the batch takes effect and the
/// fee module is locked. Failing transfers fall back to the refund address, then leave the
/// funds in escrow. A packet without an escrow record is left alone, so settling a packet
/// twice pays out once. Only store failures are returned as errors.
pub fn distribute_packet_fees_on_acknowledgement<Ctx>(
    ctx: &mut Ctx,
    output: &mut ModuleOutputBuilder,
    forward_relayer: &str,
    reverse_relayer: &str,
    packet_fees: &PacketFees,
    packet_id: &PacketId,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    distribute_batch(ctx, output, packet_fees, packet_id, |ctx, packet_fee, events| {
        let refund_address = packet_fee.refund_address.as_str();
        let fee = &packet_fee.fee;

        if can_receive::<Ctx>(ctx, forward_relayer) {
            distribute_fee(ctx, events, forward_relayer, refund_address, &fee.recv_fee)?;
        } else {
            distribute_fee(ctx, events, refund_address, refund_address, &fee.recv_fee)?;
        }
        distribute_fee(ctx, events, reverse_relayer, refund_address, &fee.ack_fee)?;
        distribute_fee(ctx, events, refund_address, refund_address, &fee.timeout_fee)
    })
}

/// Pays out the fees escrowed for a timed out packet: the timeout fee to the timeout relayer,
/// the recv and ack fees back to the refund address of each fee.
///
/// Same failure handling as [`distribute_packet_fees_on_acknowledgement`].
pub fn distribute_packet_fees_on_timeout<Ctx>(
    ctx: &mut Ctx,
    output: &mut ModuleOutputBuilder,
    timeout_relayer: &str,
    packet_fees: &PacketFees,
    packet_id: &PacketId,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    distribute_batch(ctx, output, packet_fees, packet_id, |ctx, packet_fee, events| {
        let refund_address = packet_fee.refund_address.as_str();
        let fee = &packet_fee.fee;

        let refund = fee
            .recv_fee
            .checked_add(&fee.ack_fee)
            .map_err(Error::coin)?;
        distribute_fee(ctx, events, refund_address, refund_address, &refund)?;
        distribute_fee(ctx, events, timeout_relayer, refund_address, &fee.timeout_fee)
    })
}

fn distribute_batch<Ctx, F>(
    ctx: &mut Ctx,
    output: &mut ModuleOutputBuilder,
    packet_fees: &PacketFees,
    packet_id: &PacketId,
    mut pay: F,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
    F: FnMut(&mut Ctx, &PacketFee, &mut Vec<DistributeFeeEvent>) -> Result<(), Error>,
{
    if !ctx.has_fees_in_escrow(packet_id) {
        debug!(packet_id = %packet_id, "no fees in escrow for packet, nothing to distribute");
        return Ok(());
    }

    ctx.begin();

    let batch = apply_batch(ctx, packet_fees, &mut pay);

    match batch {
        Ok(Batch::Applied(events)) => {
            ctx.commit().map_err(Error::store)?;
            ctx.delete_fees_in_escrow(packet_id);

            debug!(packet_id = %packet_id, fees = packet_fees.packet_fees.len(), "distributed packet fees");
            for event in events {
                output.emit(event.into());
            }
            Ok(())
        }
        Ok(Batch::Underfunded) => {
            ctx.discard().map_err(Error::store)?;
            error!(packet_id = %packet_id, "escrow account cannot cover packet fees");
            ctx.lock_fee_module();
            Ok(())
        }
        Err(e) => {
            ctx.discard().map_err(Error::store)?;
            Err(e)
        }
    }
}

fn apply_batch<Ctx, F>(ctx: &mut Ctx, packet_fees: &PacketFees, pay: &mut F) -> Result<Batch, Error>
where
    Ctx: FeeContext + ?Sized,
    F: FnMut(&mut Ctx, &PacketFee, &mut Vec<DistributeFeeEvent>) -> Result<(), Error>,
{
    let mut events = Vec::new();
    for packet_fee in &packet_fees.packet_fees {
        if !ctx.escrow_covers(&packet_fee.fee.total()?) {
            return Ok(Batch::Underfunded);
        }
        pay(&mut *ctx, packet_fee, &mut events)?;
    }
    Ok(Batch::Applied(events))
}

/// An empty, unparsable or blocked forward relayer address forfeits the recv fee to the
/// refund address.
fn can_receive<Ctx>(ctx: &Ctx, address: &str) -> bool
where
    Ctx: FeeContext + ?Sized,
{
    match resolve_account::<Ctx>(address) {
        Ok(account) => !ctx.is_blocked_account(&account),
        Err(_) => false,
    }
}

fn send_fee<Ctx>(ctx: &mut Ctx, receiver: &str, fee: &Coins) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let account = resolve_account::<Ctx>(receiver)?;
    if ctx.is_blocked_account(&account) {
        return Err(Error::unauthorized(receiver.to_string()));
    }
    ctx.send_coins_from_module_to_account(&account, fee)
}

/// Sends `fee` to `receiver` in its own stage, retrying with `refund_address` if that fails.
/// If the refund fails as well the funds stay in escrow.
fn distribute_fee<Ctx>(
    ctx: &mut Ctx,
    events: &mut Vec<DistributeFeeEvent>,
    receiver: &str,
    refund_address: &str,
    fee: &Coins,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    if fee.is_zero() {
        return Ok(());
    }

    let e = match staged(ctx, |ctx| send_fee(ctx, receiver, fee)) {
        Ok(()) => {
            events.push(DistributeFeeEvent {
                receiver: receiver.to_string(),
                fee: fee.clone(),
            });
            return Ok(());
        }
        Err(e) => e,
    };

    error!(receiver, fee = %fee, error = %e, "failed to pay fee");

    if receiver == refund_address {
        return Ok(());
    }

    match staged(ctx, |ctx| send_fee(ctx, refund_address, fee)) {
        Ok(()) => events.push(DistributeFeeEvent {
            receiver: refund_address.to_string(),
            fee: fee.clone(),
        }),
        Err(e) => error!(
            refund_address,
            fee = %fee,
            error = %e,
            "failed to refund fee, funds remain in escrow"
        ),
    }

    Ok(())
}

/// How refunding one packet of a closing channel ended.
enum Refund {
    Refunded,
    Skipped(Error),
    Underfunded,
}

/// Refunds every fee escrowed on a closing channel to its refund address.
///
/// Each packet is refunded in its own stage and its record deleted once all of its fees are
/// back. A packet whose refund fails keeps its record. If the escrow account runs short the
/// fee module is locked and the sweep stops; packets refunded before that stay refunded.
pub fn refund_fees_on_channel_closure<Ctx>(
    ctx: &mut Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let identified_fees = ctx.fees_in_escrow_for_channel(port_id, channel_id)?;

    for identified in identified_fees {
        let packet_id = &identified.packet_id;

        ctx.begin();

        let refund = refund_packet(ctx, &identified);

        match refund {
            Ok(Refund::Refunded) => {
                ctx.delete_fees_in_escrow(packet_id);
                ctx.commit().map_err(Error::store)?;
                debug!(packet_id = %packet_id, "refunded packet fees on channel closure");
            }
            Ok(Refund::Skipped(e)) => {
                ctx.discard().map_err(Error::store)?;
                warn!(packet_id = %packet_id, error = %e, "could not refund packet fees, keeping them in escrow");
            }
            Ok(Refund::Underfunded) => {
                ctx.discard().map_err(Error::store)?;
                error!(packet_id = %packet_id, "escrow account cannot cover fees of closing channel");
                ctx.lock_fee_module();
                return Ok(());
            }
            Err(e) => {
                ctx.discard().map_err(Error::store)?;
                return Err(e);
            }
        }
    }

    Ok(())
}

fn refund_packet<Ctx>(ctx: &mut Ctx, identified: &IdentifiedPacketFees) -> Result<Refund, Error>
where
    Ctx: FeeContext + ?Sized,
{
    for packet_fee in &identified.packet_fees {
        let total = packet_fee.fee.total()?;
        if !ctx.escrow_covers(&total) {
            return Ok(Refund::Underfunded);
        }
        if let Err(e) = send_fee(ctx, packet_fee.refund_address.as_str(), &total) {
            return Ok(Refund::Skipped(e));
        }
    }
    Ok(Refund::Refunded)
}
