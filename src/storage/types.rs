//! Page storage data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Point-in-time copy of a page's `localStorage` and `sessionStorage`.
///
/// Keys are unique per map; iteration order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSnapshot {
    pub local_storage: HashMap<String, String>,
    pub session_storage: HashMap<String, String>,
}

impl StorageSnapshot {
    /// Snapshot with no keys in either map.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.local_storage.is_empty() && self.session_storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_maps_deserialize_as_empty() {
        let snapshot: StorageSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());

        let snapshot: StorageSnapshot =
            serde_json::from_str(r#"{"localStorage":{"k":"v"}}"#).unwrap();
        assert_eq!(snapshot.local_storage.get("k").map(String::as_str), Some("v"));
        assert!(snapshot.session_storage.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut snapshot = StorageSnapshot::empty();
        snapshot.session_storage.insert("k".into(), "v".into());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["sessionStorage"]["k"], "v");
        assert!(json["localStorage"].as_object().unwrap().is_empty());
    }
}
