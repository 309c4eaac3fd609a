//! Re-index identifier-keyed summaries by generic type for reporting.

use std::collections::BTreeMap;

use blockmerge_core::{ConsolidatedSummary, GenericSourceType};

/// Regroup summaries by generic type, preserving identifier order.
///
/// Summaries with an empty type are dropped.
#[must_use]
pub fn summaries_by_type(
    by_identifier: BTreeMap<String, Vec<ConsolidatedSummary>>,
) -> BTreeMap<GenericSourceType, Vec<ConsolidatedSummary>> {
    let mut by_type: BTreeMap<GenericSourceType, Vec<ConsolidatedSummary>> = BTreeMap::new();
    for summary in by_identifier.into_values().flatten() {
        if summary.generic_source_type.is_empty() {
            continue;
        }
        by_type
            .entry(summary.generic_source_type.clone())
            .or_default()
            .push(summary);
    }
    by_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmerge_core::{ListType, Scope};

    fn summary(scope: &Scope, t: GenericSourceType, lt: ListType) -> ConsolidatedSummary {
        ConsolidatedSummary::new(scope, t, lt)
    }

    #[test]
    fn regroups_and_drops_empty_types() {
        let mini = Scope::Group("mini".into());
        let big = Scope::Group("big".into());
        let mut input = BTreeMap::new();
        input.insert(
            "mini".to_string(),
            vec![
                summary(&mini, GenericSourceType::DOMAIN, ListType::Allowlist),
                summary(&mini, GenericSourceType::IPV4, ListType::Blocklist),
                summary(&mini, GenericSourceType::new(""), ListType::Blocklist),
            ],
        );
        input.insert(
            "big".to_string(),
            vec![summary(&big, GenericSourceType::DOMAIN, ListType::Blocklist)],
        );

        let by_type = summaries_by_type(input);
        assert_eq!(by_type.len(), 2);

        let domain = &by_type[&GenericSourceType::DOMAIN];
        assert_eq!(domain.len(), 2);
        // "big" sorts before "mini".
        assert_eq!(domain[0].group.as_deref(), Some("big"));
        assert_eq!(by_type[&GenericSourceType::IPV4].len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(summaries_by_type(BTreeMap::new()).is_empty());
    }
}
