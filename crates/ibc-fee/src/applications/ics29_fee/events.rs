use super::MODULE_NAME;
use crate::coin::Coins;
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::ChannelId;
use crate::events::ModuleEvent;
use crate::prelude::*;
use crate::signer::Signer;

pub const EVENT_TYPE_INCENTIVIZED_PACKET: &str = "incentivized_ibc_packet";
pub const EVENT_TYPE_REGISTER_PAYEE: &str = "register_payee";
pub const EVENT_TYPE_REGISTER_COUNTERPARTY_PAYEE: &str = "register_counterparty_payee";
pub const EVENT_TYPE_DISTRIBUTE_FEE: &str = "distribute_fee";

pub const PORT_ID_ATTRIBUTE_KEY: &str = "port_id";
pub const CHANNEL_ID_ATTRIBUTE_KEY: &str = "channel_id";
pub const PKT_SEQ_ATTRIBUTE_KEY: &str = "packet_sequence";
pub const RECV_FEE_ATTRIBUTE_KEY: &str = "recv_fee";
pub const ACK_FEE_ATTRIBUTE_KEY: &str = "ack_fee";
pub const TIMEOUT_FEE_ATTRIBUTE_KEY: &str = "timeout_fee";
pub const RELAYER_ATTRIBUTE_KEY: &str = "relayer";
pub const PAYEE_ATTRIBUTE_KEY: &str = "payee";
pub const COUNTERPARTY_PAYEE_ATTRIBUTE_KEY: &str = "counterparty_payee";
pub const RECEIVER_ATTRIBUTE_KEY: &str = "receiver";
pub const FEE_ATTRIBUTE_KEY: &str = "fee";

/// Emitted whenever a fee is escrowed for a packet. The fee totals cover every fee escrowed
/// for the packet so far, not only the one just added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncentivizedPacketEvent {
    pub packet_id: PacketId,
    pub total_recv_fee: Coins,
    pub total_ack_fee: Coins,
    pub total_timeout_fee: Coins,
}

impl From<IncentivizedPacketEvent> for ModuleEvent {
    fn from(ev: IncentivizedPacketEvent) -> Self {
        let IncentivizedPacketEvent {
            packet_id,
            total_recv_fee,
            total_ack_fee,
            total_timeout_fee,
        } = ev;
        Self {
            kind: EVENT_TYPE_INCENTIVIZED_PACKET.to_string(),
            module_name: MODULE_NAME.to_string(),
            attributes: vec![
                (PORT_ID_ATTRIBUTE_KEY, packet_id.port_id).into(),
                (CHANNEL_ID_ATTRIBUTE_KEY, packet_id.channel_id).into(),
                (PKT_SEQ_ATTRIBUTE_KEY, packet_id.sequence).into(),
                (RECV_FEE_ATTRIBUTE_KEY, total_recv_fee).into(),
                (ACK_FEE_ATTRIBUTE_KEY, total_ack_fee).into(),
                (TIMEOUT_FEE_ATTRIBUTE_KEY, total_timeout_fee).into(),
            ],
        }
    }
}

pub struct RegisterPayeeEvent {
    pub relayer: Signer,
    pub payee: Signer,
    pub channel_id: ChannelId,
}

impl From<RegisterPayeeEvent> for ModuleEvent {
    fn from(ev: RegisterPayeeEvent) -> Self {
        Self {
            kind: EVENT_TYPE_REGISTER_PAYEE.to_string(),
            module_name: MODULE_NAME.to_string(),
            attributes: vec![
                (RELAYER_ATTRIBUTE_KEY, ev.relayer).into(),
                (PAYEE_ATTRIBUTE_KEY, ev.payee).into(),
                (CHANNEL_ID_ATTRIBUTE_KEY, ev.channel_id).into(),
            ],
        }
    }
}

pub struct RegisterCounterpartyPayeeEvent {
    pub relayer: Signer,
    pub counterparty_payee: String,
    pub channel_id: ChannelId,
}

impl From<RegisterCounterpartyPayeeEvent> for ModuleEvent {
    fn from(ev: RegisterCounterpartyPayeeEvent) -> Self {
        Self {
            kind: EVENT_TYPE_REGISTER_COUNTERPARTY_PAYEE.to_string(),
            module_name: MODULE_NAME.to_string(),
            attributes: vec![
                (RELAYER_ATTRIBUTE_KEY, ev.relayer).into(),
                (COUNTERPARTY_PAYEE_ATTRIBUTE_KEY, ev.counterparty_payee).into(),
                (CHANNEL_ID_ATTRIBUTE_KEY, ev.channel_id).into(),
            ],
        }
    }
}

/// Emitted for every fee component that reached its receiver, be it the relayer it was meant
/// for or the refund address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributeFeeEvent {
    pub receiver: String,
    pub fee: Coins,
}

impl From<DistributeFeeEvent> for ModuleEvent {
    fn from(ev: DistributeFeeEvent) -> Self {
        Self {
            kind: EVENT_TYPE_DISTRIBUTE_FEE.to_string(),
            module_name: MODULE_NAME.to_string(),
            attributes: vec![
                (RECEIVER_ATTRIBUTE_KEY, ev.receiver).into(),
                (FEE_ATTRIBUTE_KEY, ev.fee).into(),
            ],
        }
    }
}
