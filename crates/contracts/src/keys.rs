//! KeyScheme - staging key naming
//!
//! Keys are `<prefix>:<identifier>`. Grid keys hold the membership set,
//! sensor keys hold the per-node field map.

use serde::{Deserialize, Serialize};

/// Separator between key prefix and identifier
pub const KEY_SEPARATOR: char = ':';

/// Naming scheme for staged keys
///
/// # Examples
/// ```
/// use contracts::KeyScheme;
///
/// let keys = KeyScheme::default();
/// assert_eq!(keys.grid_key("site-1"), "grid:site-1");
/// assert_eq!(keys.sensor_pattern(), "sensor:*");
/// assert_eq!(KeyScheme::client_id("grid:site-1"), "site-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyScheme {
    /// Prefix of grid membership keys
    #[serde(default = "default_grid_prefix")]
    pub grid_prefix: String,

    /// Prefix of per-node reading keys
    #[serde(default = "default_sensor_prefix")]
    pub sensor_prefix: String,
}

fn default_grid_prefix() -> String {
    "grid".to_string()
}

fn default_sensor_prefix() -> String {
    "sensor".to_string()
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self {
            grid_prefix: default_grid_prefix(),
            sensor_prefix: default_sensor_prefix(),
        }
    }
}

impl KeyScheme {
    /// Create a scheme with custom prefixes
    pub fn new(grid_prefix: impl Into<String>, sensor_prefix: impl Into<String>) -> Self {
        Self {
            grid_prefix: grid_prefix.into(),
            sensor_prefix: sensor_prefix.into(),
        }
    }

    /// Membership set key for a grid
    pub fn grid_key(&self, grid_id: &str) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.grid_prefix, grid_id)
    }

    /// Field map key for a node
    pub fn sensor_key(&self, node_id: &str) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.sensor_prefix, node_id)
    }

    /// Glob matching every grid key
    pub fn grid_pattern(&self) -> String {
        format!("{}{KEY_SEPARATOR}*", self.grid_prefix)
    }

    /// Glob matching every sensor key
    pub fn sensor_pattern(&self) -> String {
        format!("{}{KEY_SEPARATOR}*", self.sensor_prefix)
    }

    /// Client id carried by a grid key: its trailing `:` segment
    pub fn client_id(grid_key: &str) -> &str {
        grid_key
            .rsplit(KEY_SEPARATOR)
            .next()
            .unwrap_or(grid_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = KeyScheme::default();
        assert_eq!(keys.grid_key("site-1"), "grid:site-1");
        assert_eq!(keys.sensor_key("A"), "sensor:A");
        assert_eq!(keys.grid_pattern(), "grid:*");
    }

    #[test]
    fn test_client_id_takes_last_segment() {
        assert_eq!(KeyScheme::client_id("grid:site-1"), "site-1");
        assert_eq!(KeyScheme::client_id("tenant:grid:site-9"), "site-9");
        assert_eq!(KeyScheme::client_id("bare"), "bare");
    }

    #[test]
    fn test_custom_prefixes() {
        let keys = KeyScheme::new("g", "s");
        assert_eq!(keys.grid_key("x"), "g:x");
        assert_eq!(keys.sensor_pattern(), "s:*");
    }
}
