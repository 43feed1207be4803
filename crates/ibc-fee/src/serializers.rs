pub mod base64 {
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde::{de, Deserialize, Deserializer, Serializer};
    use subtle_encoding::base64;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = base64::encode(bytes);
        let encoded = String::from_utf8(encoded).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        base64::decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}
