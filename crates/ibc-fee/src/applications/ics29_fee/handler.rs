//! Processing of the fee middleware messages.

use ibc_proto::google::protobuf::Any;
use ibc_proto::ibc::applications::fee::v1::{
    MsgPayPacketFee as RawMsgPayPacketFee, MsgPayPacketFeeAsync as RawMsgPayPacketFeeAsync,
    MsgRegisterCounterpartyPayee as RawMsgRegisterCounterpartyPayee,
    MsgRegisterPayee as RawMsgRegisterPayee,
};
use prost::Message;
use tracing::{debug, info};

use super::context::{resolve_account, FeeContext};
use super::error::Error;
use super::events::{RegisterCounterpartyPayeeEvent, RegisterPayeeEvent};
use super::keeper::{escrow_packet_fee, FeeEnabledStore, LockController, PayeeRegistry};
use super::keys::is_valid_key_component;
use super::msgs::pay_packet::{self, MsgPayPacketFee};
use super::msgs::pay_packet_async::{self, MsgPayPacketFeeAsync};
use super::msgs::register_counterparty_payee::{self, MsgRegisterCounterpartyPayee};
use super::msgs::register_payee::{self, MsgRegisterPayee};
use super::packet_fee::PacketFee;
use crate::core::ics04_channel::error::Error as ChannelError;
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerResult, ModuleOutputBuilder};
use crate::prelude::*;
use crate::signer::Signer;
use crate::tx_msg::Msg;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeeMsg {
    PayPacketFee(MsgPayPacketFee),
    PayPacketFeeAsync(MsgPayPacketFeeAsync),
    RegisterPayee(MsgRegisterPayee),
    RegisterCounterpartyPayee(MsgRegisterCounterpartyPayee),
}

impl TryFrom<Any> for FeeMsg {
    type Error = Error;

    fn try_from(any_msg: Any) -> Result<Self, Self::Error> {
        let value = any_msg.value.as_slice();
        match any_msg.type_url.as_str() {
            pay_packet::TYPE_URL => Ok(FeeMsg::PayPacketFee(
                RawMsgPayPacketFee::decode(value)
                    .map_err(Error::malformed_message_bytes)
                    .and_then(MsgPayPacketFee::try_from)?,
            )),
            pay_packet_async::TYPE_URL => Ok(FeeMsg::PayPacketFeeAsync(
                RawMsgPayPacketFeeAsync::decode(value)
                    .map_err(Error::malformed_message_bytes)
                    .and_then(MsgPayPacketFeeAsync::try_from)?,
            )),
            register_payee::TYPE_URL => Ok(FeeMsg::RegisterPayee(
                RawMsgRegisterPayee::decode(value)
                    .map_err(Error::malformed_message_bytes)
                    .and_then(MsgRegisterPayee::try_from)?,
            )),
            register_counterparty_payee::TYPE_URL => Ok(FeeMsg::RegisterCounterpartyPayee(
                RawMsgRegisterCounterpartyPayee::decode(value)
                    .map_err(Error::malformed_message_bytes)
                    .and_then(MsgRegisterCounterpartyPayee::try_from)?,
            )),
            _ => Err(Error::unknown_message_type_url(any_msg.type_url.clone())),
        }
    }
}

/// Validates and executes a fee message against the host context.
pub fn dispatch<Ctx>(ctx: &mut Ctx, msg: FeeMsg) -> HandlerResult<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    match msg {
        FeeMsg::PayPacketFee(msg) => process_pay_packet_fee(ctx, msg),
        FeeMsg::PayPacketFeeAsync(msg) => process_pay_packet_fee_async(ctx, msg),
        FeeMsg::RegisterPayee(msg) => process_register_payee(ctx, msg),
        FeeMsg::RegisterCounterpartyPayee(msg) => process_register_counterparty_payee(ctx, msg),
    }
}

fn ensure_channel_exists<Ctx>(
    ctx: &Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    match ctx.channel_version(port_id, channel_id) {
        Some(_) => Ok(()),
        None => Err(ChannelError::channel_not_found(port_id.clone(), channel_id.clone()).into()),
    }
}

fn ensure_fee_enabled<Ctx>(ctx: &Ctx, port_id: &PortId, channel_id: &ChannelId) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    if !ctx.is_fee_enabled(port_id, channel_id) {
        return Err(Error::fee_not_enabled(port_id.clone(), channel_id.clone()));
    }
    Ok(())
}

/// The relayer of a registration must be an account address usable as a store key component.
fn ensure_relayer_address<Ctx>(relayer: &Signer) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    if !is_valid_key_component(relayer.as_str()) {
        return Err(Error::invalid_address(relayer.to_string()));
    }
    resolve_account::<Ctx>(relayer.as_str()).map(|_| ())
}

pub fn process_register_payee<Ctx>(ctx: &mut Ctx, msg: MsgRegisterPayee) -> HandlerResult<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let mut output = ModuleOutputBuilder::new();

    msg.validate_basic()?;
    ensure_relayer_address::<Ctx>(&msg.relayer)?;

    let payee = resolve_account::<Ctx>(msg.payee.as_str())?;
    if ctx.is_blocked_account(&payee) {
        return Err(Error::unauthorized(msg.payee.to_string()));
    }

    ensure_channel_exists(ctx, &msg.port_id, &msg.channel_id)?;
    ensure_fee_enabled(ctx, &msg.port_id, &msg.channel_id)?;

    ctx.set_payee_address(msg.relayer.as_str(), msg.payee.as_str(), &msg.channel_id)?;

    info!(
        relayer = %msg.relayer,
        payee = %msg.payee,
        channel_id = %msg.channel_id,
        "registered payee address"
    );
    output.log(format!(
        "registered payee {} for relayer {} on channel {}",
        msg.payee, msg.relayer, msg.channel_id
    ));
    output.emit(
        RegisterPayeeEvent {
            relayer: msg.relayer,
            payee: msg.payee,
            channel_id: msg.channel_id,
        }
        .into(),
    );

    Ok(output.with_result(()))
}

pub fn process_register_counterparty_payee<Ctx>(
    ctx: &mut Ctx,
    msg: MsgRegisterCounterpartyPayee,
) -> HandlerResult<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let mut output = ModuleOutputBuilder::new();

    msg.validate_basic()?;
    ensure_relayer_address::<Ctx>(&msg.relayer)?;

    ensure_channel_exists(ctx, &msg.port_id, &msg.channel_id)?;
    ensure_fee_enabled(ctx, &msg.port_id, &msg.channel_id)?;

    ctx.set_counterparty_payee_address(
        msg.relayer.as_str(),
        &msg.counterparty_payee,
        &msg.channel_id,
    )?;

    info!(
        relayer = %msg.relayer,
        counterparty_payee = %msg.counterparty_payee,
        channel_id = %msg.channel_id,
        "registered counterparty payee address"
    );
    output.log(format!(
        "registered counterparty payee {} for relayer {} on channel {}",
        msg.counterparty_payee, msg.relayer, msg.channel_id
    ));
    output.emit(
        RegisterCounterpartyPayeeEvent {
            relayer: msg.relayer,
            counterparty_payee: msg.counterparty_payee,
            channel_id: msg.channel_id,
        }
        .into(),
    );

    Ok(output.with_result(()))
}

pub fn process_pay_packet_fee<Ctx>(ctx: &mut Ctx, msg: MsgPayPacketFee) -> HandlerResult<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let mut output = ModuleOutputBuilder::new();

    msg.validate_basic()?;

    ensure_fee_enabled(ctx, &msg.source_port_id, &msg.source_channel_id)?;

    if ctx.is_locked() {
        return Err(Error::fee_module_locked());
    }

    let payer = resolve_account::<Ctx>(msg.signer.as_str())?;
    if ctx.is_blocked_account(&payer) {
        return Err(Error::unauthorized(msg.signer.to_string()));
    }

    // The fee pays for the packet sent next on the channel
    let sequence = ctx
        .get_next_sequence_send(&msg.source_port_id, &msg.source_channel_id)
        .ok_or_else(|| {
            Error::sequence_send_not_found(
                msg.source_port_id.clone(),
                msg.source_channel_id.clone(),
            )
        })?;

    let packet_id = PacketId::new(msg.source_port_id, msg.source_channel_id, sequence);
    debug!(packet_id = %packet_id, payer = %msg.signer, "paying fee for next packet");

    let packet_fee = PacketFee::new(msg.fee, msg.signer, msg.relayers);
    escrow_packet_fee(ctx, &mut output, packet_id, packet_fee)?;

    Ok(output.with_result(()))
}

pub fn process_pay_packet_fee_async<Ctx>(
    ctx: &mut Ctx,
    msg: MsgPayPacketFeeAsync,
) -> HandlerResult<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let mut output = ModuleOutputBuilder::new();

    msg.validate_basic()?;

    let packet_id = msg.packet_id;

    ensure_fee_enabled(ctx, &packet_id.port_id, &packet_id.channel_id)?;

    if ctx.is_locked() {
        return Err(Error::fee_module_locked());
    }

    let next_sequence_send = ctx
        .get_next_sequence_send(&packet_id.port_id, &packet_id.channel_id)
        .ok_or_else(|| {
            Error::sequence_send_not_found(packet_id.port_id.clone(), packet_id.channel_id.clone())
        })?;

    if packet_id.sequence >= next_sequence_send {
        return Err(Error::packet_not_sent(packet_id.sequence, next_sequence_send));
    }

    if !ctx.has_packet_commitment(&packet_id) {
        return Err(Error::packet_commitment_not_found(packet_id));
    }

    escrow_packet_fee(ctx, &mut output, packet_id, msg.packet_fee)?;

    Ok(output.with_result(()))
}
