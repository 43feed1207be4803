use core::str::FromStr;

use ibc_proto::ibc::core::channel::v1::PacketId as RawPacketId;
use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;

/// The sequence number of a packet enforces ordering among packets from the same source.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
pub struct Sequence(u64);

impl FromStr for Sequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.parse::<u64>().map_err(|e| {
            Error::invalid_string_as_sequence(s.to_string(), e)
        })?))
    }
}

impl Sequence {
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn increment(&self) -> Sequence {
        Sequence(self.0 + 1)
    }
}

impl From<u64> for Sequence {
    fn from(seq: u64) -> Self {
        Sequence(seq)
    }
}

impl From<Sequence> for u64 {
    fn from(s: Sequence) -> u64 {
        s.0
    }
}

impl core::fmt::Display for Sequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// The fields of a packet the fee middleware looks at. Timeout and commitment data are
/// handled by the transport before any callback runs.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct Packet {
    pub sequence: Sequence,
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub destination_port: PortId,
    pub destination_channel: ChannelId,
    pub data: Vec<u8>,
}

impl Packet {
    /// Identifies the packet on its sending chain, where fees are escrowed.
    pub fn source_id(&self) -> PacketId {
        PacketId::new(
            self.source_port.clone(),
            self.source_channel.clone(),
            self.sequence,
        )
    }

    /// Identifies the packet on its receiving chain.
    pub fn destination_id(&self) -> PacketId {
        PacketId::new(
            self.destination_port.clone(),
            self.destination_channel.clone(),
            self.sequence,
        )
    }
}

/// Custom debug output to omit the packet data
impl core::fmt::Display for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(
            f,
            "seq:{}, path:{}/{}->{}/{}",
            self.sequence,
            self.source_channel,
            self.source_port,
            self.destination_channel,
            self.destination_port,
        )
    }
}

/// Uniquely identifies an in-flight packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PacketId {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub sequence: Sequence,
}

impl PacketId {
    pub fn new(port_id: PortId, channel_id: ChannelId, sequence: Sequence) -> Self {
        Self {
            port_id,
            channel_id,
            sequence,
        }
    }
}

impl core::fmt::Display for PacketId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(f, "{}/{}/{}", self.port_id, self.channel_id, self.sequence)
    }
}

impl TryFrom<RawPacketId> for PacketId {
    type Error = Error;

    fn try_from(raw: RawPacketId) -> Result<Self, Self::Error> {
        let port_id = PortId::from_str(&raw.port_id).map_err(Error::identifier)?;
        let channel_id = ChannelId::from_str(&raw.channel_id).map_err(Error::identifier)?;
        let sequence = Sequence::from(raw.sequence);

        if sequence.is_zero() {
            return Err(Error::zero_packet_sequence());
        }

        Ok(PacketId {
            port_id,
            channel_id,
            sequence,
        })
    }
}

impl From<PacketId> for RawPacketId {
    fn from(packet_id: PacketId) -> Self {
        RawPacketId {
            port_id: packet_id.port_id.to_string(),
            channel_id: packet_id.channel_id.to_string(),
            sequence: packet_id.sequence.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_packet_id_with_zero_sequence_is_rejected() {
        let raw = RawPacketId {
            port_id: "transfer".to_string(),
            channel_id: "channel-0".to_string(),
            sequence: 0,
        };
        assert!(PacketId::try_from(raw).is_err());
    }

    #[test]
    fn raw_packet_id_with_bad_channel_is_rejected() {
        let raw = RawPacketId {
            port_id: "transfer".to_string(),
            channel_id: "c/0".to_string(),
            sequence: 1,
        };
        assert!(PacketId::try_from(raw).is_err());
    }

    #[test]
    fn packet_ids_on_both_ends() {
        let packet = Packet {
            sequence: 7.into(),
            source_port: PortId::transfer(),
            source_channel: ChannelId::new(0),
            destination_port: PortId::transfer(),
            destination_channel: ChannelId::new(3),
            data: vec![],
        };

        assert_eq!(packet.source_id().to_string(), "transfer/channel-0/7");
        assert_eq!(packet.destination_id().to_string(), "transfer/channel-3/7");
    }
}
