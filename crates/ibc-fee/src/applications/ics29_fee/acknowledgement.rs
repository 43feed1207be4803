use serde_derive::{Deserialize, Serialize};

use super::error::Error;
use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::prelude::*;

/// The acknowledgement written on fee-enabled channels. It carries the acknowledgement of
/// the wrapped application together with the address the forward relayer wants to be paid
/// at on the sending chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncentivizedAcknowledgement {
    #[serde(with = "crate::serializers::base64", default)]
    pub app_acknowledgement: Vec<u8>,
    #[serde(default)]
    pub forward_relayer_address: String,
    #[serde(default)]
    pub underlying_app_success: bool,
}

impl IncentivizedAcknowledgement {
    pub fn new(
        app_acknowledgement: Acknowledgement,
        forward_relayer_address: impl Into<String>,
        underlying_app_success: bool,
    ) -> Self {
        Self {
            app_acknowledgement: app_acknowledgement.into_bytes(),
            forward_relayer_address: forward_relayer_address.into(),
            underlying_app_success,
        }
    }

    pub fn app_acknowledgement(&self) -> Acknowledgement {
        Acknowledgement::from(self.app_acknowledgement.clone())
    }

    pub fn success(&self) -> bool {
        self.underlying_app_success
    }
}

impl TryFrom<&Acknowledgement> for IncentivizedAcknowledgement {
    type Error = Error;

    fn try_from(ack: &Acknowledgement) -> Result<Self, Error> {
        serde_json::from_slice(ack.as_bytes()).map_err(Error::ack_unmarshal)
    }
}

impl From<IncentivizedAcknowledgement> for Acknowledgement {
    fn from(ack: IncentivizedAcknowledgement) -> Self {
        // Serializing strings, bytes and a bool into JSON cannot fail
        let encoded =
            serde_json::to_vec(&ack).expect("incentivized acknowledgement is always serializable");
        Acknowledgement::from(encoded)
    }
}
