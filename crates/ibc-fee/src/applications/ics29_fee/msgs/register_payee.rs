use core::str::FromStr;

use ibc_proto::ibc::applications::fee::v1::MsgRegisterPayee as RawMsgRegisterPayee;

use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::MODULE_NAME;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::signer::Signer;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.applications.fee.v1.MsgRegisterPayee";

/// Registers the account the ack and timeout fees earned by `relayer` on a channel are paid to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRegisterPayee {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub relayer: Signer,
    pub payee: Signer,
}

impl Msg for MsgRegisterPayee {
    type ValidationError = Error;
    type Raw = RawMsgRegisterPayee;

    fn route(&self) -> String {
        MODULE_NAME.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}

impl TryFrom<RawMsgRegisterPayee> for MsgRegisterPayee {
    type Error = Error;

    fn try_from(raw_msg: RawMsgRegisterPayee) -> Result<Self, Self::Error> {
        Ok(MsgRegisterPayee {
            port_id: PortId::from_str(&raw_msg.port_id).map_err(Error::ics24)?,
            channel_id: ChannelId::from_str(&raw_msg.channel_id).map_err(Error::ics24)?,
            relayer: Signer::from_str(&raw_msg.relayer).map_err(Error::signer)?,
            payee: Signer::from_str(&raw_msg.payee).map_err(Error::signer)?,
        })
    }
}

impl From<MsgRegisterPayee> for RawMsgRegisterPayee {
    fn from(domain_msg: MsgRegisterPayee) -> Self {
        RawMsgRegisterPayee {
            port_id: domain_msg.port_id.to_string(),
            channel_id: domain_msg.channel_id.to_string(),
            relayer: domain_msg.relayer.to_string(),
            payee: domain_msg.payee.to_string(),
        }
    }
}
