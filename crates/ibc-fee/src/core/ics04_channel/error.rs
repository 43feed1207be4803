use core::num::ParseIntError;

use flex_error::{define_error, TraceError};

use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics24_host::error::ValidationError;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        Identifier
            [ ValidationError ]
            | _ | { "identifier error" },

        InvalidStringAsSequence
            { value: String }
            [ TraceError<ParseIntError> ]
            | e | {
                format_args!(
                    "String {0} cannot be converted to packet sequence",
                    e.value)
            },

        ZeroPacketSequence
            | _ | { "packet sequence cannot be 0" },

        MissingPacketId
            | _ | { "missing packet id" },

        ChannelNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "the channel end ({0}, {1}) does not exist",
                    e.port_id, e.channel_id)
            },

        MissingNextSendSeq
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "Missing sequence number for sending packets on port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        PacketCommitmentNotFound
            { sequence: Sequence }
            | e | {
                format_args!(
                    "packet commitment not found for sequence {0}",
                    e.sequence)
            },

        AppModule
            { description: String }
            | e | {
                format_args!(
                    "application module error: {0}",
                    e.description)
            },
    }
}
