use core::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::prelude::*;

/// The version string a channel negotiated during its handshake.
///
/// Opaque to the transport. Middlewares may wrap the version of the application below them,
/// as the fee middleware does with its JSON metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Version(String);

impl Version {
    pub fn new(v: String) -> Self {
        Self(v)
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Whitespace-only versions count as empty.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Version {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<&str> for Version {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
