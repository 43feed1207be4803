use ibc_proto::ibc::applications::fee::v1::Fee as RawFee;
use serde_derive::{Deserialize, Serialize};

use super::error::Error;
use crate::coin::Coins;
use crate::prelude::*;

/// The three independent incentives attached to a packet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Paid to the relayer delivering the packet to the destination chain.
    pub recv_fee: Coins,
    /// Paid to the relayer delivering the acknowledgement back to the source chain.
    pub ack_fee: Coins,
    /// Paid to the relayer submitting a timeout for the packet.
    pub timeout_fee: Coins,
}

impl Fee {
    pub fn new(recv_fee: Coins, ack_fee: Coins, timeout_fee: Coins) -> Self {
        Self {
            recv_fee,
            ack_fee,
            timeout_fee,
        }
    }

    /// Sum of all three fee components: the amount held in escrow for this fee.
    pub fn total(&self) -> Result<Coins, Error> {
        self.recv_fee
            .checked_add(&self.ack_fee)
            .and_then(|sum| sum.checked_add(&self.timeout_fee))
            .map_err(Error::coin)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid: Vec<&str> = [
            (&self.ack_fee, "invalid acknowledgement fee"),
            (&self.recv_fee, "invalid receive fee"),
            (&self.timeout_fee, "invalid timeout fee"),
        ]
        .iter()
        .filter(|(coins, _)| !coins.is_valid())
        .map(|(_, reason)| *reason)
        .collect();

        if !invalid.is_empty() {
            return Err(Error::invalid_fee(invalid.join(", ")));
        }

        if self.ack_fee.is_zero() && self.recv_fee.is_zero() && self.timeout_fee.is_zero() {
            return Err(Error::all_fees_zero());
        }

        Ok(())
    }
}

impl TryFrom<RawFee> for Fee {
    type Error = Error;

    fn try_from(raw: RawFee) -> Result<Self, Self::Error> {
        Ok(Fee {
            recv_fee: raw.recv_fee.try_into().map_err(Error::coin)?,
            ack_fee: raw.ack_fee.try_into().map_err(Error::coin)?,
            timeout_fee: raw.timeout_fee.try_into().map_err(Error::coin)?,
        })
    }
}

impl From<Fee> for RawFee {
    fn from(fee: Fee) -> Self {
        RawFee {
            recv_fee: fee.recv_fee.into(),
            ack_fee: fee.ack_fee.into(),
            timeout_fee: fee.timeout_fee.into(),
        }
    }
}
