//! State kept by the fee middleware and the operations moving escrowed funds.
//!
//! Plain state access is provided by extension traits implemented for every [`KvStore`]:
//! [`FeeEnabledStore`], [`LockController`], [`PayeeRegistry`] and [`EscrowStore`]. Operations
//! that move funds ([`escrow_packet_fee`], the distribution functions and
//! [`refund_fees_on_channel_closure`]) need the whole [`FeeContext`] and stage their writes in
//! an overlay of the store.
//!
//! [`FeeContext`]: super::context::FeeContext

use super::error::Error;
use crate::prelude::*;
use crate::store::{KvStore, TransactionalStore};

mod channel;
mod distribute;
mod escrow;
mod lock;
mod payee;
pub mod query;

pub use channel::{FeeEnabledChannel, FeeEnabledStore};
pub use distribute::{
    distribute_packet_fees_on_acknowledgement, distribute_packet_fees_on_timeout,
    refund_fees_on_channel_closure,
};
pub use escrow::{escrow_packet_fee, EscrowStore};
pub use lock::LockController;
pub use payee::{ForwardRelayerAddress, PayeeRegistry, RegisteredCounterpartyPayee, RegisteredPayee};

/// Runs `f` in a fresh overlay, committing it if `f` succeeds and discarding it otherwise.
pub(crate) fn staged<Ctx, T, F>(ctx: &mut Ctx, f: F) -> Result<T, Error>
where
    Ctx: TransactionalStore + ?Sized,
    F: FnOnce(&mut Ctx) -> Result<T, Error>,
{
    ctx.begin();
    match f(ctx) {
        Ok(value) => {
            ctx.commit().map_err(Error::store)?;
            Ok(value)
        }
        Err(e) => {
            ctx.discard().map_err(Error::store)?;
            Err(e)
        }
    }
}

fn keys_with_prefix<S: KvStore + ?Sized>(store: &S, prefix: &str) -> Vec<(String, Vec<u8>)> {
    store
        .prefix_iter(prefix.as_bytes())
        .into_iter()
        .map(|(key, value)| (String::from_utf8_lossy(&key).into_owned(), value))
        .collect()
}
