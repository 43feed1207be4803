use tracing::{error, info};

use crate::applications::ics29_fee::keys::LOCKED_KEY;
use crate::store::KvStore;

/// The chain-wide circuit breaker. It is tripped when the escrow account turns out to hold
/// less than the fees recorded against it, after which all fee logic is bypassed until an
/// operator clears it.
pub trait LockController: KvStore {
    /// Any stored value other than `false` counts as locked.
    fn is_locked(&self) -> bool {
        self.get(LOCKED_KEY.as_bytes())
            .map_or(false, |value| value != b"false")
    }

    fn lock_fee_module(&mut self) {
        error!("fee module locked: escrow account cannot cover the fees recorded against it");
        self.set(LOCKED_KEY.as_bytes().to_vec(), b"true".to_vec());
    }

    /// Clears the lock. Never called by the middleware itself.
    fn unlock_fee_module(&mut self) {
        info!("fee module unlocked");
        self.delete(LOCKED_KEY.as_bytes());
    }
}

impl<S: KvStore + ?Sized> LockController for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{OverlayStore, TransactionalStore};

    #[test_log::test]
    fn lock_survives_until_explicitly_cleared() {
        let mut store = OverlayStore::new();
        assert!(!store.is_locked());

        store.lock_fee_module();
        assert!(store.is_locked());

        store.unlock_fee_module();
        assert!(!store.is_locked());
    }

    #[test_log::test]
    fn lock_tripped_inside_discarded_stage_is_lost() {
        let mut store = OverlayStore::new();
        store.begin();
        store.lock_fee_module();
        store.discard().unwrap();
        assert!(!store.is_locked());
    }

    #[test]
    fn explicit_false_is_unlocked() {
        let mut store = OverlayStore::new();
        store.set(LOCKED_KEY.as_bytes().to_vec(), b"false".to_vec());
        assert!(!store.is_locked());
    }
}
