use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;

/// Opaque credential bag loaded from the object store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, with = "base64_map")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// Fetch a key as UTF-8 text, if present and valid.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(|v| String::from_utf8(v.clone()).ok())
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(|v| v.as_slice())
    }
}

/// Secret values travel base64-encoded on the wire, mirroring the store's
/// native representation.
mod base64_map {
    use std::collections::BTreeMap;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(k, v)| (k, STANDARD.encode(v))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let raw: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                STANDARD
                    .decode(v.as_bytes())
                    .map(|d| (k, d))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_round_trips_through_base64() {
        let mut secret = Secret::default();
        secret.data.insert("token".into(), b"super-secret".to_vec());

        let json = serde_json::to_value(&secret).unwrap();
        assert_eq!(json["data"]["token"], "c3VwZXItc2VjcmV0");

        let back: Secret = serde_json::from_value(json).unwrap();
        assert_eq!(back.get_str("token").as_deref(), Some("super-secret"));
    }

    #[test]
    fn get_str_misses_cleanly() {
        let secret = Secret::default();
        assert!(secret.get_str("token").is_none());
    }
}
