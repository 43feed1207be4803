use flex_error::{define_error, TraceError};

use crate::coin::CoinError;
use crate::core::ics04_channel::error::Error as ChannelError;
use crate::core::ics04_channel::packet::{PacketId, Sequence};
use crate::core::ics24_host::error::ValidationError;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::signer::SignerError;
use crate::store::StoreError;

define_error! {
    #[derive(Debug)]
    Error {
        Channel
            [ ChannelError ]
            | _ | { "channel error" },

        Ics24
            [ ValidationError ]
            | _ | { "ics24 identifier error" },

        Signer
            [ SignerError ]
            | _ | { "failed to parse signer" },

        Coin
            [ CoinError ]
            | _ | { "invalid coins" },

        Store
            [ StoreError ]
            | _ | { "fee store error" },

        EmptyFee
            | _ | { "expect fee field to be non-empty" },

        EmptyPacketId
            | _ | { "expect packet_id field to be non-empty" },

        EmptyPacketFee
            | _ | { "expect packet_fee field to be non-empty" },

        InvalidFee
            { reason: String }
            | e | { format_args!("contains invalid fees: {0}", e.reason) },

        AllFeesZero
            | _ | { "all fees are zero" },

        RelayersNotEmpty
            | _ | { "relayers must not be set. This feature is not supported" },

        EmptyCounterpartyPayee
            | _ | { "counterparty payee must not be empty" },

        InvalidAddress
            { address: String }
            | e | { format_args!("invalid account address: {0}", e.address) },

        InvalidVersion
            { expected: String, actual: String }
            | e | {
                format_args!(
                    "invalid ICS29 middleware version: expected {0}, got {1}",
                    e.expected, e.actual)
            },

        InvalidVersionMetadata
            { version: String }
            | e | {
                format_args!(
                    "failed to unmarshal ICS29 version metadata: {0}",
                    e.version)
            },

        AckUnmarshal
            [ TraceError<serde_json::Error> ]
            | _ | { "cannot unmarshal ICS-29 incentivized packet acknowledgement" },

        FeeNotEnabled
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "fee module is not enabled for port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        FeeModuleLocked
            | _ | { "the fee module is currently locked, a severe bug has been detected" },

        RefundAccountNotFound
            { address: String }
            | e | { format_args!("account with address {0} not found", e.address) },

        Unauthorized
            { address: String }
            | e | { format_args!("{0} is not allowed to receive funds", e.address) },

        InsufficientFunds
            { account: String, required: String }
            | e | {
                format_args!(
                    "account {0} has insufficient funds, required {1}",
                    e.account, e.required)
            },

        SequenceSendNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "sequence send not found for port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        PacketNotSent
            { sequence: Sequence, next_sequence_send: Sequence }
            | e | {
                format_args!(
                    "packet has not been sent: sequence {0} is not lower than next send sequence {1}",
                    e.sequence, e.next_sequence_send)
            },

        PacketCommitmentNotFound
            { packet_id: PacketId }
            | e | {
                format_args!(
                    "packet {0} has already been acknowledged or timed out",
                    e.packet_id)
            },

        RelayerNotFoundForAsyncAck
            { packet_id: PacketId }
            | e | {
                format_args!(
                    "relayer address must be stored for async WriteAcknowledgement of packet {0}",
                    e.packet_id)
            },

        MalformedStoreKey
            { key: String }
            | e | { format_args!("malformed fee store key: {0}", e.key) },

        UnknownMessageTypeUrl
            { url: String }
            | e | { format_args!("unknown type URL {0}", e.url) },

        MalformedMessageBytes
            [ TraceError<prost::DecodeError> ]
            | _ | { "the message is malformed and cannot be decoded" },
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Error::channel(e)
    }
}
