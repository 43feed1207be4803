use ibc_proto::ibc::applications::fee::v1::MsgPayPacketFeeAsync as RawMsgPayPacketFeeAsync;

use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::packet_fee::PacketFee;
use crate::applications::ics29_fee::MODULE_NAME;
use crate::core::ics04_channel::packet::PacketId;
use crate::prelude::*;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.applications.fee.v1.MsgPayPacketFeeAsync";

/// Escrows a fee for a packet that has already been sent and is still in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgPayPacketFeeAsync {
    pub packet_id: PacketId,
    pub packet_fee: PacketFee,
}

impl Msg for MsgPayPacketFeeAsync {
    type ValidationError = Error;
    type Raw = RawMsgPayPacketFeeAsync;

    fn route(&self) -> String {
        MODULE_NAME.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.packet_fee.validate()
    }
}

impl TryFrom<RawMsgPayPacketFeeAsync> for MsgPayPacketFeeAsync {
    type Error = Error;

    fn try_from(raw_msg: RawMsgPayPacketFeeAsync) -> Result<Self, Self::Error> {
        let raw_packet_id = raw_msg.packet_id.ok_or_else(Error::empty_packet_id)?;
        let packet_id = PacketId::try_from(raw_packet_id).map_err(Error::channel)?;

        let raw_packet_fee = raw_msg.packet_fee.ok_or_else(Error::empty_packet_fee)?;
        let packet_fee = PacketFee::try_from(raw_packet_fee)?;

        Ok(MsgPayPacketFeeAsync {
            packet_id,
            packet_fee,
        })
    }
}

impl From<MsgPayPacketFeeAsync> for RawMsgPayPacketFeeAsync {
    fn from(domain_msg: MsgPayPacketFeeAsync) -> Self {
        RawMsgPayPacketFeeAsync {
            packet_id: Some(domain_msg.packet_id.into()),
            packet_fee: Some(domain_msg.packet_fee.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ibc_proto::ibc::applications::fee::v1::PacketFee as RawPacketFee;
    use ibc_proto::ibc::core::channel::v1::PacketId as RawPacketId;

    use super::*;
    use crate::test_utils::{default_fee, get_dummy_refund_account};

    fn get_dummy_raw_msg_pay_packet_fee_async() -> RawMsgPayPacketFeeAsync {
        RawMsgPayPacketFeeAsync {
            packet_id: Some(RawPacketId {
                port_id: "transfer".to_string(),
                channel_id: "channel-0".to_string(),
                sequence: 1,
            }),
            packet_fee: Some(RawPacketFee {
                fee: Some(default_fee().into()),
                refund_address: get_dummy_refund_account().to_string(),
                relayers: vec![],
            }),
        }
    }

    #[test]
    fn parse_and_validate() {
        let default_raw = get_dummy_raw_msg_pay_packet_fee_async();

        let msg = MsgPayPacketFeeAsync::try_from(default_raw.clone()).unwrap();
        assert!(msg.validate_basic().is_ok());
        assert_eq!(msg.packet_id.to_string(), "transfer/channel-0/1");

        let missing_packet_id = RawMsgPayPacketFeeAsync {
            packet_id: None,
            ..default_raw.clone()
        };
        assert!(MsgPayPacketFeeAsync::try_from(missing_packet_id).is_err());

        let zero_sequence = RawMsgPayPacketFeeAsync {
            packet_id: Some(RawPacketId {
                port_id: "transfer".to_string(),
                channel_id: "channel-0".to_string(),
                sequence: 0,
            }),
            ..default_raw.clone()
        };
        assert!(MsgPayPacketFeeAsync::try_from(zero_sequence).is_err());

        let missing_packet_fee = RawMsgPayPacketFeeAsync {
            packet_fee: None,
            ..default_raw
        };
        assert!(MsgPayPacketFeeAsync::try_from(missing_packet_fee).is_err());
    }

    #[test]
    fn restricted_relayers_fail_validation() {
        let mut raw = get_dummy_raw_msg_pay_packet_fee_async();
        if let Some(packet_fee) = raw.packet_fee.as_mut() {
            packet_fee.relayers = vec!["cosmos1relayer".to_string()];
        }

        let msg = MsgPayPacketFeeAsync::try_from(raw).unwrap();
        assert!(msg.validate_basic().is_err());
    }
}
