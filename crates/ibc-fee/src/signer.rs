use core::str::FromStr;

use derive_more::Display;
use flex_error::define_error;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    SignerError {
        EmptySigner
            | _ | { "signer cannot be empty" },
    }
}

/// An account address as it appears in messages and fee records.
///
/// The middleware never interprets the address; the host ledger decides whether it
/// resolves to an account.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub struct Signer(String);

impl Signer {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Signer {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_string();
        if s.trim().is_empty() {
            return Err(SignerError::empty_signer());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for Signer {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Signer> for String {
    fn from(signer: Signer) -> Self {
        signer.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_signer_is_rejected() {
        assert!(Signer::from_str("").is_err());
        assert!(Signer::from_str("   ").is_err());
        assert_eq!(Signer::from_str("cosmos1abc").unwrap().as_str(), "cosmos1abc");
    }
}
