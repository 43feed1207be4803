use core::str::FromStr;

use ibc_proto::ibc::applications::fee::v1::{
    IdentifiedPacketFees as ProtoIdentifiedPacketFees, PacketFee as ProtoPacketFee,
    PacketFees as ProtoPacketFees,
};
use serde_derive::{Deserialize, Serialize};

use super::error::Error;
use super::fee::Fee;
use crate::coin::Coins;
use crate::core::ics04_channel::packet::PacketId;
use crate::prelude::*;
use crate::signer::Signer;

/// A fee escrowed for a packet, together with the account that paid it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFee {
    pub fee: Fee,
    pub refund_address: Signer,
    /// Reserved for restricting which relayers may claim the fee; must be empty.
    pub relayers: Vec<String>,
}

impl PacketFee {
    pub fn new(fee: Fee, refund_address: Signer, relayers: Vec<String>) -> Self {
        Self {
            fee,
            refund_address,
            relayers,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.relayers.is_empty() {
            return Err(Error::relayers_not_empty());
        }
        self.fee.validate()
    }
}

/// All fees escrowed for one packet, most recent first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketFees {
    pub packet_fees: Vec<PacketFee>,
}

impl PacketFees {
    pub fn new(packet_fees: Vec<PacketFee>) -> Self {
        Self { packet_fees }
    }

    pub fn total_recv_fees(&self) -> Result<Coins, Error> {
        self.sum(|fee| &fee.recv_fee)
    }

    pub fn total_ack_fees(&self) -> Result<Coins, Error> {
        self.sum(|fee| &fee.ack_fee)
    }

    pub fn total_timeout_fees(&self) -> Result<Coins, Error> {
        self.sum(|fee| &fee.timeout_fee)
    }

    /// Sum of `Fee::total` over every fee, i.e. what the escrow account holds for the packet.
    pub fn total(&self) -> Result<Coins, Error> {
        self.packet_fees
            .iter()
            .try_fold(Coins::new(), |acc, packet_fee| {
                acc.checked_add(&packet_fee.fee.total()?)
                    .map_err(Error::coin)
            })
    }

    fn sum(&self, component: impl Fn(&Fee) -> &Coins) -> Result<Coins, Error> {
        self.packet_fees
            .iter()
            .try_fold(Coins::new(), |acc, packet_fee| {
                acc.checked_add(component(&packet_fee.fee))
            })
            .map_err(Error::coin)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedPacketFees {
    pub packet_id: PacketId,
    pub packet_fees: Vec<PacketFee>,
}

impl TryFrom<ProtoPacketFee> for PacketFee {
    type Error = Error;

    fn try_from(packet_fee: ProtoPacketFee) -> Result<Self, Error> {
        let fee = packet_fee.fee.ok_or_else(Error::empty_fee)?.try_into()?;

        let refund_address = Signer::from_str(&packet_fee.refund_address).map_err(Error::signer)?;

        Ok(PacketFee {
            fee,
            refund_address,
            relayers: packet_fee.relayers,
        })
    }
}

impl From<PacketFee> for ProtoPacketFee {
    fn from(packet_fee: PacketFee) -> Self {
        ProtoPacketFee {
            fee: Some(packet_fee.fee.into()),
            refund_address: packet_fee.refund_address.to_string(),
            relayers: packet_fee.relayers,
        }
    }
}

impl TryFrom<ProtoPacketFees> for PacketFees {
    type Error = Error;

    fn try_from(fees: ProtoPacketFees) -> Result<Self, Error> {
        let packet_fees = fees
            .packet_fees
            .into_iter()
            .map(PacketFee::try_from)
            .collect::<Result<_, _>>()?;

        Ok(PacketFees { packet_fees })
    }
}

impl TryFrom<ProtoIdentifiedPacketFees> for IdentifiedPacketFees {
    type Error = Error;

    fn try_from(fees: ProtoIdentifiedPacketFees) -> Result<Self, Error> {
        let raw_packet_id = fees.packet_id.ok_or_else(Error::empty_packet_id)?;

        let packet_id =
            PacketId::try_from(raw_packet_id).map_err(Error::channel)?;

        let packet_fees = fees
            .packet_fees
            .into_iter()
            .map(PacketFee::try_from)
            .collect::<Result<_, _>>()?;

        Ok(IdentifiedPacketFees {
            packet_id,
            packet_fees,
        })
    }
}

impl From<IdentifiedPacketFees> for ProtoIdentifiedPacketFees {
    fn from(fees: IdentifiedPacketFees) -> Self {
        ProtoIdentifiedPacketFees {
            packet_id: Some(fees.packet_id.into()),
            packet_fees: fees.packet_fees.into_iter().map(Into::into).collect(),
        }
    }
}
