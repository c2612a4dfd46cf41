//! Filter merge
//!
//! Combines the filters already active on a list view with the filters a
//! panel just submitted. For replacing operators the incoming group wins
//! wholesale; additive operators accumulate, deduplicated only by exact
//! value. Which operators replace is policy, not contract: the backend has
//! shipped under both classifications, so callers can pin either.

use std::collections::{HashMap, HashSet};

use crate::filter::{Filter, Operator};

#[derive(Debug, Clone)]
pub struct MergePolicy {
    /// A new value for the same group key supersedes the old one.
    replacing: HashSet<Operator>,
    /// Replacing operators that may still hold several simultaneous values
    /// per group (one `=` filter per selected enum option).
    multi_value: HashSet<Operator>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            replacing: HashSet::from([
                Operator::Gte,
                Operator::Lte,
                Operator::In,
                Operator::Like,
                Operator::Eq,
                Operator::Equals,
            ]),
            multi_value: HashSet::from([Operator::Eq, Operator::Equals]),
        }
    }
}

impl MergePolicy {
    pub fn new(replacing: HashSet<Operator>, multi_value: HashSet<Operator>) -> Self {
        Self {
            replacing,
            multi_value,
        }
    }

    /// The classification earlier backends expected: `=`/`equals` are plain
    /// additive and no multi-value distinction exists.
    pub fn legacy() -> Self {
        Self {
            replacing: HashSet::from([
                Operator::Gte,
                Operator::Lte,
                Operator::In,
                Operator::Like,
            ]),
            multi_value: HashSet::new(),
        }
    }

    pub fn is_replacing(&self, op: &Operator) -> bool {
        self.replacing.contains(op)
    }

    pub fn is_multi_value(&self, op: &Operator) -> bool {
        self.multi_value.contains(op)
    }

    /// Merge `incoming` into `existing`. Total over well-formed input: no
    /// failure modes, stable and deterministic for identical inputs.
    /// Surviving existing entries keep their original order, incoming
    /// entries follow in submission order; a key collision updates the
    /// entry in place without moving it.
    pub fn merge(&self, existing: &[Filter], incoming: &[Filter]) -> Vec<Filter> {
        // Every group an incoming replacing filter touches is cleared from
        // the existing side first, so a panel can change or narrow its own
        // contribution without leaving stale entries.
        let groups_to_replace: HashSet<String> = incoming
            .iter()
            .filter(|f| self.is_replacing(&f.operator))
            .map(Filter::group_key)
            .collect();

        let mut out: Vec<Filter> = Vec::with_capacity(existing.len() + incoming.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut upsert = |key: String, filter: &Filter| match index.get(&key) {
            Some(&i) => out[i] = filter.clone(),
            None => {
                index.insert(key, out.len());
                out.push(filter.clone());
            }
        };

        for f in existing {
            if self.is_replacing(&f.operator) {
                if groups_to_replace.contains(&f.group_key()) {
                    continue;
                }
                if self.is_multi_value(&f.operator) {
                    upsert(f.value_key(), f);
                } else {
                    upsert(f.group_key(), f);
                }
            } else {
                upsert(f.value_key(), f);
            }
        }

        for f in incoming {
            if self.is_replacing(&f.operator) && !self.is_multi_value(&f.operator) {
                upsert(f.group_key(), f);
            } else {
                upsert(f.value_key(), f);
            }
        }

        out
    }
}

/// Merge under the default policy.
pub fn merge_filters(existing: &[Filter], incoming: &[Filter]) -> Vec<Filter> {
    MergePolicy::default().merge(existing, incoming)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;

    fn f(field: &str, op: Operator, value: impl Into<FilterValue>) -> Filter {
        Filter::new("transactions", field, op, value)
    }

    #[test]
    fn test_single_value_replacement() {
        // Re-submitting the same group with a new value leaves exactly one
        // filter, the new one.
        let existing = vec![f("amount", Operator::Gte, "10.0000")];
        let incoming = vec![f("amount", Operator::Gte, "25.0000")];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged, vec![f("amount", Operator::Gte, "25.0000")]);
    }

    #[test]
    fn test_multi_value_accumulation() {
        let existing = vec![f("category_id", Operator::Eq, 1)];
        let incoming = vec![f("category_id", Operator::Eq, 2)];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].value, FilterValue::Int(1));
        assert_eq!(merged[1].value, FilterValue::Int(2));
    }

    #[test]
    fn test_unrelated_groups_do_not_interact() {
        let existing = vec![f("amount", Operator::Gte, "10.0000")];
        let incoming = vec![f("date", Operator::Gte, "2024-01-01")];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(
            merged,
            vec![
                f("amount", Operator::Gte, "10.0000"),
                f("date", Operator::Gte, "2024-01-01"),
            ]
        );
    }

    #[test]
    fn test_multi_select_resubmission_replaces_own_group() {
        // A multi-select re-submitting [2, 3] clears its prior [1, 2].
        let existing = vec![
            f("category_id", Operator::Eq, 1),
            f("category_id", Operator::Eq, 2),
            f("amount", Operator::Lte, "100.0000"),
        ];
        let incoming = vec![
            f("category_id", Operator::Eq, 2),
            f("category_id", Operator::Eq, 3),
        ];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(
            merged,
            vec![
                f("amount", Operator::Lte, "100.0000"),
                f("category_id", Operator::Eq, 2),
                f("category_id", Operator::Eq, 3),
            ]
        );
    }

    #[test]
    fn test_untouched_multi_value_group_survives_whole() {
        // A panel submitting elsewhere must not collapse another panel's
        // multi-select values.
        let existing = vec![
            f("category_id", Operator::Eq, 1),
            f("category_id", Operator::Eq, 2),
        ];
        let incoming = vec![f("date", Operator::Gte, "2024-01-01")];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].value, FilterValue::Int(1));
        assert_eq!(merged[1].value, FilterValue::Int(2));
    }

    #[test]
    fn test_like_replaces_under_default_policy() {
        let existing = vec![f("description", Operator::Like, "coffee")];
        let incoming = vec![f("description", Operator::Like, "rent")];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged, vec![f("description", Operator::Like, "rent")]);
    }

    #[test]
    fn test_additive_when_excluded_from_replacing_set() {
        // Policy with `like` reclassified as additive: instances accumulate
        // and dedupe only on exact value.
        let policy = MergePolicy::new(
            HashSet::from([Operator::Gte, Operator::Lte]),
            HashSet::new(),
        );

        let existing = vec![f("description", Operator::Like, "coffee")];
        let incoming = vec![
            f("description", Operator::Like, "rent"),
            f("description", Operator::Like, "coffee"),
        ];

        let merged = policy.merge(&existing, &incoming);
        assert_eq!(
            merged,
            vec![
                f("description", Operator::Like, "coffee"),
                f("description", Operator::Like, "rent"),
            ]
        );
    }

    #[test]
    fn test_legacy_policy_treats_eq_as_additive() {
        let policy = MergePolicy::legacy();
        assert!(policy.is_replacing(&Operator::Like));
        assert!(!policy.is_replacing(&Operator::Eq));

        let existing = vec![f("category_id", Operator::Eq, 1)];
        let incoming = vec![f("category_id", Operator::Eq, 1)];

        // Same value key: still just one instance.
        let merged = policy.merge(&existing, &incoming);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_unknown_operator_is_additive() {
        let existing = vec![f("amount", Operator::Other("between".into()), "a")];
        let incoming = vec![f("amount", Operator::Other("between".into()), "b")];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_null_value_still_replaces_group() {
        // Callers are expected to drop empties before merging, but if one
        // arrives it clears the group like any other value.
        let existing = vec![f("amount", Operator::Gte, "10.0000")];
        let incoming = vec![Filter::new(
            "transactions",
            "amount",
            Operator::Gte,
            FilterValue::Null,
        )];

        let merged = merge_filters(&existing, &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, FilterValue::Null);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let existing = vec![
            f("amount", Operator::Gte, "10.0000"),
            f("category_id", Operator::Eq, 1),
            f("description", Operator::Like, "coffee"),
        ];
        let incoming = vec![
            f("category_id", Operator::Eq, 2),
            f("date", Operator::Lte, "2024-06-30"),
        ];

        let a = merge_filters(&existing, &incoming);
        let b = merge_filters(&existing, &incoming);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_sides() {
        let some = vec![f("amount", Operator::Gte, "10.0000")];
        assert_eq!(merge_filters(&[], &some), some);
        assert_eq!(merge_filters(&some, &[]), some);
        assert!(merge_filters(&[], &[]).is_empty());
    }
}
