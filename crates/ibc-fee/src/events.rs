use core::fmt::{Display, Error as FmtError, Formatter};

use serde_derive::{Deserialize, Serialize};

use crate::prelude::*;

/// An event emitted by an application module, in the generic key/value form hosts
/// forward to their event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEvent {
    pub kind: String,
    pub module_name: String,
    pub attributes: Vec<ModuleEventAttribute>,
}

impl ModuleEvent {
    /// Returns the value of the first attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

impl Display for ModuleEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{} ({}) {{", self.kind, self.module_name)?;
        for attr in &self.attributes {
            write!(f, " {}={}", attr.key, attr.value)?;
        }
        write!(f, " }}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEventAttribute {
    pub key: String,
    pub value: String,
}

impl<K: ToString, V: ToString> From<(K, V)> for ModuleEventAttribute {
    fn from((k, v): (K, V)) -> Self {
        Self {
            key: k.to_string(),
            value: v.to_string(),
        }
    }
}
