//! The host capabilities the fee middleware is written against.

use core::fmt::Display;
use core::str::FromStr;

use sha2::{Digest, Sha256};

use super::error::Error;
use crate::coin::{Amount, Coins};
use crate::core::ics04_channel::context::{ChannelReader, Ics4Wrapper};
use crate::prelude::*;
use crate::signer::Signer;
use crate::store::TransactionalStore;

/// The ledger primitive fees are moved with. The escrow account is the module account of the
/// fee middleware, as known to the host.
pub trait BankKeeper {
    type AccountId;

    /// True if the ledger knows an account with this address.
    fn account_exists(&self, account: &Self::AccountId) -> bool;

    /// True if the account may not receive funds, e.g. module accounts.
    fn is_blocked_account(&self, account: &Self::AccountId) -> bool;

    /// The balance of the fee escrow account in `denom`.
    fn get_module_balance(&self, denom: &str) -> Amount;

    /// Moves `amt` from a user account into the fee escrow account.
    fn send_coins_from_account_to_module(
        &mut self,
        from: &Self::AccountId,
        amt: &Coins,
    ) -> Result<(), Error>;

    /// Moves `amt` out of the fee escrow account.
    fn send_coins_from_module_to_account(
        &mut self,
        to: &Self::AccountId,
        amt: &Coins,
    ) -> Result<(), Error>;

    /// True if the escrow account holds at least `amt`.
    fn escrow_covers(&self, amt: &Coins) -> bool {
        amt.iter()
            .all(|coin| self.get_module_balance(&coin.denom) >= coin.amount)
    }
}

/// Captures all the dependencies the fee middleware requires: its own transactional store,
/// the channel transport below it and the ledger.
///
/// Ledger balances must live in the same transactional scope as the store, so that discarding
/// an overlay also undoes the transfers made in it.
pub trait FeeContext:
    TransactionalStore
    + ChannelReader
    + Ics4Wrapper
    + BankKeeper<AccountId = <Self as FeeContext>::AccountId>
{
    type AccountId: TryFrom<Signer> + Clone + PartialEq + Display;
}

/// Resolves an address to a ledger account, failing if it does not parse as a signer or as
/// an account id.
pub fn resolve_account<Ctx>(address: &str) -> Result<<Ctx as FeeContext>::AccountId, Error>
where
    Ctx: FeeContext + ?Sized,
{
    let signer = Signer::from_str(address).map_err(Error::signer)?;
    <<Ctx as FeeContext>::AccountId as TryFrom<Signer>>::try_from(signer)
        .map_err(|_| Error::invalid_address(address.to_string()))
}

/// The raw address of a cosmos-sdk module account: the first 20 bytes of the SHA-256 hash of
/// the module name.
pub fn cosmos_module_address(module_name: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(module_name.as_bytes());

    let mut hash = hasher.finalize().to_vec();
    hash.truncate(20);
    hash
}
