use serde_derive::{Deserialize, Serialize};

use super::keys_with_prefix;
use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::keys::{
    fee_enabled_key, parse_fee_enabled_key, FEE_ENABLED_KEY_PREFIX,
};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::store::KvStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEnabledChannel {
    pub port_id: PortId,
    pub channel_id: ChannelId,
}

/// Tracks which channels negotiated the fee version during their handshake.
pub trait FeeEnabledStore: KvStore {
    fn is_fee_enabled(&self, port_id: &PortId, channel_id: &ChannelId) -> bool {
        self.has(fee_enabled_key(port_id, channel_id).as_bytes())
    }

    fn set_fee_enabled(&mut self, port_id: &PortId, channel_id: &ChannelId) {
        self.set(
            fee_enabled_key(port_id, channel_id).into_bytes(),
            b"true".to_vec(),
        );
    }

    fn delete_fee_enabled(&mut self, port_id: &PortId, channel_id: &ChannelId) {
        self.delete(fee_enabled_key(port_id, channel_id).as_bytes());
    }

    fn fee_enabled_channels(&self) -> Result<Vec<FeeEnabledChannel>, Error> {
        keys_with_prefix(self, &format!("{}/", FEE_ENABLED_KEY_PREFIX))
            .into_iter()
            .map(|(key, _)| {
                parse_fee_enabled_key(&key).map(|(port_id, channel_id)| FeeEnabledChannel {
                    port_id,
                    channel_id,
                })
            })
            .collect()
    }
}

impl<S: KvStore + ?Sized> FeeEnabledStore for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OverlayStore;

    #[test]
    fn enabled_channels_are_listed() {
        let mut store = OverlayStore::new();
        store.set_fee_enabled(&PortId::transfer(), &ChannelId::new(0));
        store.set_fee_enabled(&PortId::transfer(), &ChannelId::new(1));
        store.delete_fee_enabled(&PortId::transfer(), &ChannelId::new(0));

        assert!(!store.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
        assert!(store.is_fee_enabled(&PortId::transfer(), &ChannelId::new(1)));
        assert_eq!(
            store.fee_enabled_channels().unwrap(),
            vec![FeeEnabledChannel {
                port_id: PortId::transfer(),
                channel_id: ChannelId::new(1),
            }]
        );
    }
}
