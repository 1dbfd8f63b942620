//! Expiry policy configuration.
//!
//! Decides which catalog items are eligible for deletion.
//!
//! # Example
//!
//! ```toml
//! [policy]
//! marker_tags = ["auto-delete-1h"]
//! max_age_minutes = 60
//! title_prefix = "Konfigurator:"
//! ```

use serde::{Deserialize, Serialize};

/// Expiry policy configuration.
///
/// An item is a deletion candidate when it carries at least one marker tag,
/// is at least `max_age_minutes` old (if set), and its title starts with
/// `title_prefix` (if set).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Tags that mark an item for removal. Matched case-sensitively; any one
    /// of them is enough.
    pub marker_tags: Vec<String>,

    /// Minimum age in minutes before a marked item is removed.
    /// Omit to remove marked items immediately.
    #[serde(default)]
    pub max_age_minutes: Option<u64>,

    /// Required title prefix, compared case-insensitively.
    #[serde(default)]
    pub title_prefix: Option<String>,
}

impl PolicyConfig {
    /// Configured age threshold, `None` when unset or out of range.
    pub fn max_age(&self) -> Option<chrono::Duration> {
        let minutes = i64::try_from(self.max_age_minutes?).ok()?;
        chrono::Duration::try_minutes(minutes)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.marker_tags.iter().all(|t| t.trim().is_empty()) {
            return Err("policy: `marker_tags` must contain at least one non-empty tag".to_string());
        }
        if self.max_age_minutes.is_some() && self.max_age().is_none() {
            return Err("policy: `max_age_minutes` is out of range".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_policy() {
        let config: PolicyConfig = toml::from_str(r#"marker_tags = ["auto-delete-1h"]"#).unwrap();
        assert_eq!(config.marker_tags, vec!["auto-delete-1h"]);
        assert!(config.max_age_minutes.is_none());
        assert!(config.title_prefix.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_policy() {
        let config: PolicyConfig = toml::from_str(
            r#"
            marker_tags = ["a", "b"]
            max_age_minutes = 90
            title_prefix = "Konfigurator:"
        "#,
        )
        .unwrap();
        assert_eq!(config.max_age_minutes, Some(90));
        assert_eq!(config.title_prefix.as_deref(), Some("Konfigurator:"));
    }

    #[test]
    fn test_missing_marker_tags_is_parse_error() {
        assert!(toml::from_str::<PolicyConfig>("max_age_minutes = 5").is_err());
    }

    #[test]
    fn test_blank_marker_tags_rejected() {
        let config = PolicyConfig {
            marker_tags: vec![],
            max_age_minutes: None,
            title_prefix: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_age_conversion() {
        let mut config = PolicyConfig {
            marker_tags: vec!["x".to_string()],
            max_age_minutes: Some(60),
            title_prefix: None,
        };
        assert_eq!(config.max_age(), Some(chrono::Duration::minutes(60)));

        config.max_age_minutes = Some(u64::MAX);
        assert!(config.max_age().is_none());
        assert!(config.validate().is_err());
    }
}
