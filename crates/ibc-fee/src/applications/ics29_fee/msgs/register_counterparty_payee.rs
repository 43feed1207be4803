use core::str::FromStr;

use ibc_proto::ibc::applications::fee::v1::MsgRegisterCounterpartyPayee as RawMsgRegisterCounterpartyPayee;

use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::MODULE_NAME;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::signer::Signer;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.applications.fee.v1.MsgRegisterCounterpartyPayee";

/// Registers the address on the counterparty chain that the recv fees earned by `relayer` are
/// paid to. The address is never interpreted on this chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRegisterCounterpartyPayee {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub relayer: Signer,
    pub counterparty_payee: String,
}

impl Msg for MsgRegisterCounterpartyPayee {
    type ValidationError = Error;
    type Raw = RawMsgRegisterCounterpartyPayee;

    fn route(&self) -> String {
        MODULE_NAME.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        if self.counterparty_payee.trim().is_empty() {
            return Err(Error::empty_counterparty_payee());
        }
        Ok(())
    }
}

impl TryFrom<RawMsgRegisterCounterpartyPayee> for MsgRegisterCounterpartyPayee {
    type Error = Error;

    fn try_from(raw_msg: RawMsgRegisterCounterpartyPayee) -> Result<Self, Self::Error> {
        Ok(MsgRegisterCounterpartyPayee {
            port_id: PortId::from_str(&raw_msg.port_id).map_err(Error::ics24)?,
            channel_id: ChannelId::from_str(&raw_msg.channel_id).map_err(Error::ics24)?,
            relayer: Signer::from_str(&raw_msg.relayer).map_err(Error::signer)?,
            counterparty_payee: raw_msg.counterparty_payee,
        })
    }
}

impl From<MsgRegisterCounterpartyPayee> for RawMsgRegisterCounterpartyPayee {
    fn from(domain_msg: MsgRegisterCounterpartyPayee) -> Self {
        RawMsgRegisterCounterpartyPayee {
            port_id: domain_msg.port_id.to_string(),
            channel_id: domain_msg.channel_id.to_string(),
            relayer: domain_msg.relayer.to_string(),
            counterparty_payee: domain_msg.counterparty_payee,
        }
    }
}
