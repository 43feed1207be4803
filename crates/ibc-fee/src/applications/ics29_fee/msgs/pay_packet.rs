use core::str::FromStr;

use ibc_proto::ibc::applications::fee::v1::MsgPayPacketFee as RawMsgPayPacketFee;

use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::fee::Fee;
use crate::applications::ics29_fee::MODULE_NAME;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::signer::Signer;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.applications.fee.v1.MsgPayPacketFee";

/// Escrows a fee for the next packet to be sent on a channel. Meant to be submitted in the
/// same transaction as the message sending that packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgPayPacketFee {
    pub fee: Fee,
    pub source_port_id: PortId,
    pub source_channel_id: ChannelId,
    /// Pays the fee and receives any refund.
    pub signer: Signer,
    pub relayers: Vec<String>,
}

impl Msg for MsgPayPacketFee {
    type ValidationError = Error;
    type Raw = RawMsgPayPacketFee;

    fn route(&self) -> String {
        MODULE_NAME.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        if !self.relayers.is_empty() {
            return Err(Error::relayers_not_empty());
        }
        self.fee.validate()
    }
}

impl TryFrom<RawMsgPayPacketFee> for MsgPayPacketFee {
    type Error = Error;

    fn try_from(raw_msg: RawMsgPayPacketFee) -> Result<Self, Self::Error> {
        Ok(MsgPayPacketFee {
            fee: raw_msg.fee.ok_or_else(Error::empty_fee)?.try_into()?,
            source_port_id: PortId::from_str(&raw_msg.source_port_id).map_err(Error::ics24)?,
            source_channel_id: ChannelId::from_str(&raw_msg.source_channel_id)
                .map_err(Error::ics24)?,
            signer: Signer::from_str(&raw_msg.signer).map_err(Error::signer)?,
            relayers: raw_msg.relayers,
        })
    }
}

impl From<MsgPayPacketFee> for RawMsgPayPacketFee {
    fn from(domain_msg: MsgPayPacketFee) -> Self {
        RawMsgPayPacketFee {
            fee: Some(domain_msg.fee.into()),
            source_port_id: domain_msg.source_port_id.to_string(),
            source_channel_id: domain_msg.source_channel_id.to_string(),
            signer: domain_msg.signer.to_string(),
            relayers: domain_msg.relayers,
        }
    }
}
