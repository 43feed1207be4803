use serde_derive::{Deserialize, Serialize};

use super::keys_with_prefix;
use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::keys::{
    counterparty_payee_key, forward_relayer_key, parse_packet_key, parse_payee_key, payee_key,
    COUNTERPARTY_PAYEE_KEY_PREFIX, FORWARD_RELAYER_KEY_PREFIX, PAYEE_KEY_PREFIX,
};
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::ChannelId;
use crate::prelude::*;
use crate::store::{get_json, set_json, KvStore};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredPayee {
    pub channel_id: ChannelId,
    pub relayer: String,
    pub payee: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCounterpartyPayee {
    pub channel_id: ChannelId,
    pub relayer: String,
    pub counterparty_payee: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRelayerAddress {
    pub address: String,
    pub packet_id: PacketId,
}

/// Where relayers want to be paid.
///
/// The payee of a relayer receives the ack and timeout fees the relayer earns on this chain.
/// The counterparty payee is the address, on the counterparty chain, that the recv fee of
/// packets the relayer delivers here is paid to; it travels back inside the acknowledgement.
pub trait PayeeRegistry: KvStore {
    fn set_payee_address(
        &mut self,
        relayer: &str,
        payee: &str,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        set_json(self, &payee_key(relayer, channel_id), &payee).map_err(Error::store)
    }

    fn get_payee_address(
        &self,
        relayer: &str,
        channel_id: &ChannelId,
    ) -> Result<Option<String>, Error> {
        get_json(self, &payee_key(relayer, channel_id)).map_err(Error::store)
    }

    fn set_counterparty_payee_address(
        &mut self,
        relayer: &str,
        counterparty_payee: &str,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        set_json(
            self,
            &counterparty_payee_key(relayer, channel_id),
            &counterparty_payee,
        )
        .map_err(Error::store)
    }

    fn get_counterparty_payee_address(
        &self,
        relayer: &str,
        channel_id: &ChannelId,
    ) -> Result<Option<String>, Error> {
        get_json(self, &counterparty_payee_key(relayer, channel_id)).map_err(Error::store)
    }

    /// Remembers the relayer that delivered a packet whose acknowledgement is written
    /// asynchronously, so that the acknowledgement can still name its payee.
    fn set_relayer_address_for_async_ack(
        &mut self,
        packet_id: &PacketId,
        relayer: &str,
    ) -> Result<(), Error> {
        set_json(self, &forward_relayer_key(packet_id), &relayer).map_err(Error::store)
    }

    fn get_relayer_address_for_async_ack(
        &self,
        packet_id: &PacketId,
    ) -> Result<Option<String>, Error> {
        get_json(self, &forward_relayer_key(packet_id)).map_err(Error::store)
    }

    fn delete_forward_relayer_address(&mut self, packet_id: &PacketId) {
        self.delete(forward_relayer_key(packet_id).as_bytes());
    }

    fn all_payees(&self) -> Result<Vec<RegisteredPayee>, Error> {
        keys_with_prefix(self, &format!("{}/", PAYEE_KEY_PREFIX))
            .into_iter()
            .map(|(key, value)| {
                let (relayer, channel_id) = parse_payee_key(&key, PAYEE_KEY_PREFIX)?;
                let payee = decode(&key, &value)?;
                Ok(RegisteredPayee {
                    channel_id,
                    relayer,
                    payee,
                })
            })
            .collect()
    }

    fn all_counterparty_payees(&self) -> Result<Vec<RegisteredCounterpartyPayee>, Error> {
        keys_with_prefix(self, &format!("{}/", COUNTERPARTY_PAYEE_KEY_PREFIX))
            .into_iter()
            .map(|(key, value)| {
                let (relayer, channel_id) = parse_payee_key(&key, COUNTERPARTY_PAYEE_KEY_PREFIX)?;
                let counterparty_payee = decode(&key, &value)?;
                Ok(RegisteredCounterpartyPayee {
                    channel_id,
                    relayer,
                    counterparty_payee,
                })
            })
            .collect()
    }

    fn all_forward_relayers(&self) -> Result<Vec<ForwardRelayerAddress>, Error> {
        keys_with_prefix(self, &format!("{}/", FORWARD_RELAYER_KEY_PREFIX))
            .into_iter()
            .map(|(key, value)| {
                let packet_id = parse_packet_key(&key, FORWARD_RELAYER_KEY_PREFIX)?;
                let address = decode(&key, &value)?;
                Ok(ForwardRelayerAddress { address, packet_id })
            })
            .collect()
    }
}

impl<S: KvStore + ?Sized> PayeeRegistry for S {}

fn decode(key: &str, value: &[u8]) -> Result<String, Error> {
    serde_json::from_slice(value)
        .map_err(|e| Error::store(crate::store::StoreError::decode(key.to_string(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ics24_host::identifier::PortId;
    use crate::store::OverlayStore;

    #[test]
    fn last_registration_wins() {
        let mut store = OverlayStore::new();
        let channel_id = ChannelId::new(0);

        store
            .set_payee_address("cosmos1relayer", "cosmos1first", &channel_id)
            .unwrap();
        store
            .set_payee_address("cosmos1relayer", "cosmos1second", &channel_id)
            .unwrap();

        assert_eq!(
            store
                .get_payee_address("cosmos1relayer", &channel_id)
                .unwrap()
                .as_deref(),
            Some("cosmos1second")
        );
        assert_eq!(
            store
                .get_payee_address("cosmos1relayer", &ChannelId::new(1))
                .unwrap(),
            None
        );
        assert_eq!(store.all_payees().unwrap().len(), 1);
    }

    #[test]
    fn payees_and_counterparty_payees_do_not_collide() {
        let mut store = OverlayStore::new();
        let channel_id = ChannelId::new(0);

        store
            .set_payee_address("cosmos1relayer", "cosmos1payee", &channel_id)
            .unwrap();
        store
            .set_counterparty_payee_address("cosmos1relayer", "osmo1payee", &channel_id)
            .unwrap();

        assert_eq!(
            store.all_payees().unwrap(),
            vec![RegisteredPayee {
                channel_id: channel_id.clone(),
                relayer: "cosmos1relayer".to_string(),
                payee: "cosmos1payee".to_string(),
            }]
        );
        assert_eq!(
            store.all_counterparty_payees().unwrap(),
            vec![RegisteredCounterpartyPayee {
                channel_id,
                relayer: "cosmos1relayer".to_string(),
                counterparty_payee: "osmo1payee".to_string(),
            }]
        );
    }

    #[test]
    fn forward_relayer_lifecycle() {
        let mut store = OverlayStore::new();
        let packet_id = PacketId::new(PortId::transfer(), ChannelId::new(2), 5.into());

        store
            .set_relayer_address_for_async_ack(&packet_id, "cosmos1relayer")
            .unwrap();
        assert_eq!(
            store.all_forward_relayers().unwrap(),
            vec![ForwardRelayerAddress {
                address: "cosmos1relayer".to_string(),
                packet_id: packet_id.clone(),
            }]
        );

        store.delete_forward_relayer_address(&packet_id);
        assert_eq!(
            store.get_relayer_address_for_async_ack(&packet_id).unwrap(),
            None
        );
    }
}
