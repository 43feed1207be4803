//! Keys under which the fee middleware keeps its state.

use core::str::FromStr;

use super::error::Error;
use crate::core::ics04_channel::packet::{PacketId, Sequence};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;

pub const FEE_ENABLED_KEY_PREFIX: &str = "feeEnabled";
pub const PAYEE_KEY_PREFIX: &str = "payee";
pub const COUNTERPARTY_PAYEE_KEY_PREFIX: &str = "counterpartyPayee";
pub const FORWARD_RELAYER_KEY_PREFIX: &str = "forwardRelayer";
pub const FEES_IN_ESCROW_KEY_PREFIX: &str = "feesInEscrow";
pub const LOCKED_KEY: &str = "Locked";

/// Whether `address` can be used as a single component of a payee key.
pub fn is_valid_key_component(address: &str) -> bool {
    !address.is_empty() && !address.contains('/')
}

pub fn fee_enabled_key(port_id: &PortId, channel_id: &ChannelId) -> String {
    format!("{}/{}/{}", FEE_ENABLED_KEY_PREFIX, port_id, channel_id)
}

pub fn payee_key(relayer: &str, channel_id: &ChannelId) -> String {
    format!("{}/{}/{}", PAYEE_KEY_PREFIX, relayer, channel_id)
}

pub fn counterparty_payee_key(relayer: &str, channel_id: &ChannelId) -> String {
    format!("{}/{}/{}", COUNTERPARTY_PAYEE_KEY_PREFIX, relayer, channel_id)
}

pub fn forward_relayer_key(packet_id: &PacketId) -> String {
    format!("{}/{}", FORWARD_RELAYER_KEY_PREFIX, packet_id)
}

pub fn fees_in_escrow_key(packet_id: &PacketId) -> String {
    format!("{}/{}", FEES_IN_ESCROW_KEY_PREFIX, packet_id)
}

/// Prefix of all escrow keys of a channel, including the trailing separator.
pub fn fees_in_escrow_channel_prefix(port_id: &PortId, channel_id: &ChannelId) -> String {
    format!("{}/{}/{}/", FEES_IN_ESCROW_KEY_PREFIX, port_id, channel_id)
}

fn split_key<'a>(key: &'a str, prefix: &str, parts: usize) -> Result<Vec<&'a str>, Error> {
    let malformed = || Error::malformed_store_key(key.to_string());

    let rest = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(malformed)?;

    let split: Vec<&str> = rest.split('/').collect();
    if split.len() != parts {
        return Err(malformed());
    }

    Ok(split)
}

/// Parses a `{prefix}/{port}/{channel}/{sequence}` key back into the packet it belongs to.
pub fn parse_packet_key(key: &str, prefix: &str) -> Result<PacketId, Error> {
    let parts = split_key(key, prefix, 3)?;

    Ok(PacketId {
        port_id: PortId::from_str(parts[0]).map_err(Error::ics24)?,
        channel_id: ChannelId::from_str(parts[1]).map_err(Error::ics24)?,
        sequence: Sequence::from_str(parts[2]).map_err(Error::channel)?,
    })
}

/// Parses a `feeEnabled/{port}/{channel}` key.
pub fn parse_fee_enabled_key(key: &str) -> Result<(PortId, ChannelId), Error> {
    let parts = split_key(key, FEE_ENABLED_KEY_PREFIX, 2)?;

    Ok((
        PortId::from_str(parts[0]).map_err(Error::ics24)?,
        ChannelId::from_str(parts[1]).map_err(Error::ics24)?,
    ))
}

/// Parses a `{prefix}/{relayer}/{channel}` payee key.
pub fn parse_payee_key(key: &str, prefix: &str) -> Result<(String, ChannelId), Error> {
    let parts = split_key(key, prefix, 2)?;

    Ok((
        parts[0].to_string(),
        ChannelId::from_str(parts[1]).map_err(Error::ics24)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_keys_parse_back() {
        let packet_id = PacketId::new(PortId::transfer(), ChannelId::new(4), 11.into());
        let key = fees_in_escrow_key(&packet_id);

        assert_eq!(key, "feesInEscrow/transfer/channel-4/11");
        assert!(key.starts_with(&fees_in_escrow_channel_prefix(
            &PortId::transfer(),
            &ChannelId::new(4)
        )));
        assert_eq!(
            parse_packet_key(&key, FEES_IN_ESCROW_KEY_PREFIX).unwrap(),
            packet_id
        );
    }

    #[test]
    fn payee_keys_parse_back() {
        let key = payee_key("cosmos1relayer", &ChannelId::new(0));
        assert_eq!(key, "payee/cosmos1relayer/channel-0");
        assert_eq!(
            parse_payee_key(&key, PAYEE_KEY_PREFIX).unwrap(),
            ("cosmos1relayer".to_string(), ChannelId::new(0))
        );
    }

    #[test]
    fn key_components_cannot_hold_separators() {
        assert!(is_valid_key_component("cosmos1relayer"));
        assert!(!is_valid_key_component(""));
        assert!(!is_valid_key_component("cosmos1/relayer"));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(parse_packet_key("feesInEscrow/transfer/channel-0", FEES_IN_ESCROW_KEY_PREFIX).is_err());
        assert!(parse_packet_key("feesInEscrow/transfer/channel-0/x", FEES_IN_ESCROW_KEY_PREFIX).is_err());
        assert!(parse_fee_enabled_key("payee/transfer/channel-0").is_err());
    }
}
