//! Expiry policy: which listed items are deletion candidates.
//!
//! Matching is a pure function of the item, the policy and the caller's
//! clock. Tags are already parsed by the client (see
//! [`parse_tags`](crate::catalog::parse_tags)); matching compares them
//! case-sensitively against the marker set.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::{
    catalog::{Candidate, CatalogItem},
    config::PolicyConfig,
};

/// Marker tags plus optional age and title constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    marker_tags: BTreeSet<String>,
    max_age: Option<Duration>,
    title_prefix: Option<String>,
}

impl Policy {
    /// A policy matching any item that carries one of `marker_tags`.
    ///
    /// Tags are trimmed; blank tags are ignored.
    pub fn new<I, S>(marker_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let marker_tags = marker_tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            marker_tags,
            max_age: None,
            title_prefix: None,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut policy = Self::new(&config.marker_tags);
        policy.max_age = config.max_age();
        policy.title_prefix = config.title_prefix.clone().filter(|p| !p.is_empty());
        policy
    }

    /// Only match items at least this old.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Only match items whose title starts with `prefix` (ASCII
    /// case-insensitive).
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into()).filter(|p| !p.is_empty());
        self
    }

    pub fn marker_tags(&self) -> &BTreeSet<String> {
        &self.marker_tags
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn title_prefix(&self) -> Option<&str> {
        self.title_prefix.as_deref()
    }

    /// A policy without marker tags can never match anything.
    pub fn has_markers(&self) -> bool {
        !self.marker_tags.is_empty()
    }

    /// Latest creation time that still counts as expired.
    ///
    /// `None` means no age constraint. If subtracting `max_age` leaves the
    /// representable range, the cutoff is the earliest representable instant.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let max_age = self.max_age?;
        Some(
            now.checked_sub_signed(max_age)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// Whether `item` is a deletion candidate at `now`.
    ///
    /// An item exactly `max_age` old matches.
    pub fn matches(&self, item: &CatalogItem, now: DateTime<Utc>) -> bool {
        let marked = item.tags.iter().any(|t| self.marker_tags.contains(t));
        if !marked {
            return false;
        }

        if let Some(cutoff) = self.cutoff(now) {
            match item.created_at {
                Some(created_at) if created_at <= cutoff => {}
                _ => return false,
            }
        }

        match &self.title_prefix {
            Some(prefix) => item
                .title
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            None => true,
        }
    }

    /// Apply the policy to a listing, keeping listing order.
    pub fn candidates<'a, I>(&self, items: I, now: DateTime<Utc>) -> Vec<Candidate>
    where
        I: IntoIterator<Item = &'a CatalogItem>,
    {
        items
            .into_iter()
            .filter(|item| self.matches(item, now))
            .map(Candidate::from)
            .collect()
    }
}

/// Free-function form of [`Policy::matches`].
pub fn matches(item: &CatalogItem, policy: &Policy, now: DateTime<Utc>) -> bool {
    policy.matches(item, now)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::catalog::{ItemId, parse_tags};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn item(tags: &str, age_minutes: Option<i64>) -> CatalogItem {
        CatalogItem {
            id: ItemId::from(1),
            title: "Konfigurator: Custom Board".to_string(),
            tags: parse_tags(tags),
            created_at: age_minutes.map(|m| now() - Duration::minutes(m)),
            status: Some("active".to_string()),
        }
    }

    fn hourly() -> Policy {
        Policy::new(["auto-delete-1h"]).with_max_age(Duration::minutes(60))
    }

    #[test]
    fn test_marked_item_with_extra_tags_matches() {
        let policy = Policy::new(["auto-delete-1h"]);
        let item = item("auto-delete-1h, configurator-hidden , ", Some(0));
        assert!(policy.matches(&item, now()));
    }

    #[test]
    fn test_unmarked_item_does_not_match() {
        let policy = Policy::new(["auto-delete-1h"]);
        assert!(!policy.matches(&item("configurator-hidden", Some(600)), now()));
        assert!(!policy.matches(&item("", Some(600)), now()));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let policy = Policy::new(["auto-delete-1h"]);
        assert!(!policy.matches(&item("Auto-Delete-1H", None), now()));
    }

    #[test]
    fn test_any_marker_is_enough() {
        let policy = Policy::new(["a", "b", "c"]);
        assert!(policy.matches(&item("x, b", None), now()));
    }

    #[rstest]
    #[case::thirty_minutes(30, false)]
    #[case::fifty_nine_minutes(59, false)]
    #[case::exactly_sixty(60, true)]
    #[case::ninety_minutes(90, true)]
    #[case::future(-5, false)]
    fn test_age_boundary(#[case] age_minutes: i64, #[case] expected: bool) {
        let item = item("auto-delete-1h", Some(age_minutes));
        assert_eq!(hourly().matches(&item, now()), expected);
    }

    #[test]
    fn test_one_second_short_of_cutoff() {
        let mut item = item("auto-delete-1h", None);
        item.created_at = Some(now() - Duration::minutes(60) + Duration::seconds(1));
        assert!(!hourly().matches(&item, now()));
    }

    #[test]
    fn test_unknown_creation_time_never_old_enough() {
        assert!(!hourly().matches(&item("auto-delete-1h", None), now()));
        // Without an age constraint the creation time is irrelevant.
        assert!(Policy::new(["auto-delete-1h"]).matches(&item("auto-delete-1h", None), now()));
    }

    #[test]
    fn test_title_prefix_case_insensitive() {
        let policy = Policy::new(["auto-delete-1h"]).with_title_prefix("konfigurator:");
        assert!(policy.matches(&item("auto-delete-1h", None), now()));

        let mut other = item("auto-delete-1h", None);
        other.title = "Gift card".to_string();
        assert!(!policy.matches(&other, now()));

        other.title = "Kö".to_string();
        assert!(!policy.matches(&other, now()));
    }

    #[test]
    fn test_empty_title_prefix_is_ignored() {
        let policy = Policy::new(["auto-delete-1h"]).with_title_prefix("");
        assert!(policy.title_prefix().is_none());
    }

    #[test]
    fn test_new_trims_and_drops_blank_markers() {
        let policy = Policy::new([" auto-delete-1h ", "", "  "]);
        assert_eq!(
            policy.marker_tags().iter().collect::<Vec<_>>(),
            vec!["auto-delete-1h"]
        );
        assert!(!Policy::new([" "]).has_markers());
    }

    #[test]
    fn test_from_config() {
        let config = PolicyConfig {
            marker_tags: vec!["auto-delete-1h".to_string()],
            max_age_minutes: Some(60),
            title_prefix: Some("Konfigurator:".to_string()),
        };
        let policy = Policy::from_config(&config);
        assert_eq!(policy.max_age(), Some(Duration::minutes(60)));
        assert_eq!(policy.title_prefix(), Some("Konfigurator:"));
    }

    #[test]
    fn test_cutoff_saturates() {
        let policy = Policy::new(["x"]).with_max_age(Duration::MAX);
        assert_eq!(policy.cutoff(now()), Some(DateTime::<Utc>::MIN_UTC));
        assert!(Policy::new(["x"]).cutoff(now()).is_none());
    }

    #[test]
    fn test_candidates_keep_order() {
        let policy = Policy::new(["m"]);
        let items: Vec<CatalogItem> = (1..=4u64)
            .map(|id| CatalogItem {
                id: ItemId::from(id),
                title: String::new(),
                tags: if id % 2 == 0 { vec!["m".to_string()] } else { vec![] },
                created_at: None,
                status: None,
            })
            .collect();

        let ids: Vec<_> = policy
            .candidates(&items, now())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![ItemId::from(2), ItemId::from(4)]);
    }

    fn tag_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("auto-delete-1h".to_string()),
            Just("configurator-hidden".to_string()),
            Just("AUTO-DELETE-1H".to_string()),
            Just(String::new()),
            "[a-z]{1,6}",
        ]
    }

    fn raw_tags_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec((tag_strategy(), "[ \t]{0,2}", "[ \t]{0,2}"), 0..6).prop_map(
            |parts| {
                parts
                    .into_iter()
                    .map(|(tag, pre, post)| format!("{pre}{tag}{post}"))
                    .collect::<Vec<_>>()
                    .join(",")
            },
        )
    }

    proptest! {
        #[test]
        fn prop_matches_iff_marker_and_old_enough(
            raw in raw_tags_strategy(),
            age_minutes in -120i64..240,
            max_age in prop::option::of(0i64..180),
        ) {
            let markers: BTreeSet<String> = ["auto-delete-1h".to_string()].into();
            let mut policy = Policy::new(&markers);
            if let Some(m) = max_age {
                policy = policy.with_max_age(Duration::minutes(m));
            }
            let item = CatalogItem {
                id: ItemId::from(1),
                title: String::new(),
                tags: parse_tags(&raw),
                created_at: Some(now() - Duration::minutes(age_minutes)),
                status: None,
            };

            let parsed: BTreeSet<String> = raw
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            let marked = !parsed.is_disjoint(&markers);
            let old_enough = max_age.is_none_or(|m| age_minutes >= m);

            prop_assert_eq!(policy.matches(&item, now()), marked && old_enough);
        }

        #[test]
        fn prop_parsed_tags_are_trimmed_unique_nonempty(raw in raw_tags_strategy()) {
            let tags = parse_tags(&raw);
            let unique: BTreeSet<&String> = tags.iter().collect();
            prop_assert_eq!(unique.len(), tags.len());
            for tag in &tags {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
            }
        }
    }
}
