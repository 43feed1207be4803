use derive_more::{From, Into};
use serde_derive::{Deserialize, Serialize};

use crate::prelude::*;

/// A generic acknowledgement: the opaque bytes an application writes in response to a
/// received packet, relayed back verbatim to the sending chain.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, From, Into)]
pub struct Acknowledgement(Vec<u8>);

impl Acknowledgement {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Acknowledgement {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
