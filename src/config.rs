//! Adapter configuration.

use serde::{Deserialize, Serialize};

/// Tunables shared by the adapter families.
///
/// Every adapter has a `new()` constructor that uses [`AdapterConfig::default`]
/// and a `with_config` constructor for everything else.
///
/// ```
/// use record_adapters::config::AdapterConfig;
///
/// let config: AdapterConfig = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
/// assert_eq!(config.key_marker, "@");
/// assert!(config.pretty);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Prefix marking the key field of a wire-format schema.
    pub key_marker: String,
    /// JSON tables stop sampling rows for field names once this many consecutive
    /// rows contribute no new key. `0` scans every row.
    pub field_sample_window: usize,
    /// Pretty-print in `serialize`.
    pub pretty: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            key_marker: "@".to_string(),
            field_sample_window: 16,
            pretty: false,
        }
    }
}
