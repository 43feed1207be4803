//! The version string negotiated for fee-enabled channels.

use serde_derive::{Deserialize, Serialize};

use super::VERSION;
use crate::core::ics04_channel::Version;
use crate::prelude::*;

/// The channel version used by the fee middleware: the fee protocol version together with
/// the version of the application it wraps, encoded as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    #[serde(default)]
    pub fee_version: String,
    #[serde(default)]
    pub app_version: String,
}

impl Metadata {
    pub fn new(app_version: impl Into<String>) -> Self {
        Self {
            fee_version: VERSION.to_string(),
            app_version: app_version.into(),
        }
    }

    /// Parses a channel version as fee metadata, returning `None` if it is not a JSON
    /// encoded metadata record.
    pub fn from_version(version: &Version) -> Option<Self> {
        serde_json::from_str(version.as_str()).ok()
    }

    pub fn has_fee_version(&self) -> bool {
        self.fee_version == VERSION
    }

    pub fn to_version(&self) -> Version {
        // Serializing a struct of two strings cannot fail
        let encoded = serde_json::to_string(self).expect("fee metadata is always serializable");
        Version::new(encoded)
    }

    pub fn app_version(&self) -> Version {
        Version::new(self.app_version.clone())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form() {
        let version = Metadata::new("ics20-1").to_version();
        assert_eq!(
            version.as_str(),
            r#"{"fee_version":"ics29-1","app_version":"ics20-1"}"#
        );
        assert_eq!(
            Metadata::from_version(&version),
            Some(Metadata::new("ics20-1"))
        );
    }

    #[test]
    fn non_metadata_versions_do_not_parse() {
        assert_eq!(Metadata::from_version(&Version::new("ics20-1".to_string())), None);
        assert_eq!(Metadata::from_version(&Version::empty()), None);
        assert_eq!(
            Metadata::from_version(&Version::new(r#"{"fee_version":"ics29-1","extra":1}"#.to_string())),
            None
        );
    }

    #[test]
    fn foreign_fee_version_parses_but_is_flagged() {
        let metadata =
            Metadata::from_version(&Version::new(r#"{"fee_version":"ics29-2","app_version":"v"}"#.to_string()))
                .unwrap();
        assert!(!metadata.has_fee_version());
    }
}
