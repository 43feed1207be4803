//! Byte-keyed state storage with discardable overlays.
//!
//! Every piece of state the fee middleware owns (escrowed fees, payees, the module lock,
//! ...) is read and written through [`KvStore`]. Operations that must apply all of their
//! writes or none of them run inside an overlay opened with [`TransactionalStore::begin`]
//! and closed with either [`TransactionalStore::commit`] or [`TransactionalStore::discard`].
//! Overlays nest: committing an inner overlay folds its writes into the enclosing one, which
//! may itself still be discarded.

use alloc::collections::BTreeMap;

use flex_error::{define_error, TraceError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::prelude::*;

define_error! {
    #[derive(Debug)]
    StoreError {
        NoOpenTransaction
            | _ | { "no open transaction to commit or discard" },

        Encode
            { key: String }
            [ TraceError<serde_json::Error> ]
            | e | { format_args!("failed to encode value stored under key {0}", e.key) },

        Decode
            { key: String }
            [ TraceError<serde_json::Error> ]
            | e | { format_args!("failed to decode value stored under key {0}", e.key) },
    }
}

pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn prefix_iter(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

pub trait TransactionalStore: KvStore {
    /// Opens a new overlay on top of the current state.
    fn begin(&mut self);

    /// Folds the innermost overlay into the layer below it.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Drops the innermost overlay together with all of its writes.
    fn discard(&mut self) -> Result<(), StoreError>;

    /// Number of currently open overlays.
    fn depth(&self) -> usize;
}

/// Reads a JSON-encoded value.
pub fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KvStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .get(key.as_bytes())
        .map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|e| StoreError::decode(key.to_string(), e))
        })
        .transpose()
}

/// Writes a value JSON-encoded.
pub fn set_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KvStore + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::encode(key.to_string(), e))?;
    store.set(key.as_bytes().to_vec(), bytes);
    Ok(())
}

/// An in-memory [`TransactionalStore`]: a committed base map plus a stack of journals.
///
/// A journal entry of `None` is a tombstone hiding whatever lies below it.
#[derive(Clone, Debug, Default)]
pub struct OverlayStore {
    base: BTreeMap<Vec<u8>, Vec<u8>>,
    overlays: Vec<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, key: Vec<u8>, value: Option<Vec<u8>>) {
        match self.overlays.last_mut() {
            Some(overlay) => {
                overlay.insert(key, value);
            }
            None => match value {
                Some(value) => {
                    self.base.insert(key, value);
                }
                None => {
                    self.base.remove(&key);
                }
            },
        }
    }
}

impl KvStore for OverlayStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        for overlay in self.overlays.iter().rev() {
            if let Some(entry) = overlay.get(key) {
                return entry.clone();
            }
        }
        self.base.get(key).cloned()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.write(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.write(key.to_vec(), None);
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = self
            .base
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();

        for overlay in &self.overlays {
            for (k, v) in overlay
                .range(prefix.to_vec()..)
                .take_while(|(k, _)| k.starts_with(prefix))
            {
                merged.insert(k.clone(), v.clone());
            }
        }

        merged
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

impl TransactionalStore for OverlayStore {
    fn begin(&mut self) {
        self.overlays.push(BTreeMap::new());
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let top = self
            .overlays
            .pop()
            .ok_or_else(StoreError::no_open_transaction)?;

        for (key, value) in top {
            self.write(key, value);
        }

        Ok(())
    }

    fn discard(&mut self) -> Result<(), StoreError> {
        self.overlays
            .pop()
            .map(|_| ())
            .ok_or_else(StoreError::no_open_transaction)
    }

    fn depth(&self) -> usize {
        self.overlays.len()
    }
}
