//! Raw label count canonicalization.
//!
//! Evaluation runs report free-form answers ("lions", "doggo", "tigress"...).
//! Normalization folds those into canonical labels in two passes: a static
//! variant table, then plural folding for keys whose singular form also
//! appears. Counts are only ever merged, never dropped.

use crate::constants::normalize::{LABEL_VARIANTS, MIN_PLURAL_LEN, PLURAL_SUFFIX};
use crate::data::CountMap;
use crate::types::{Count, Label};

/// Resolve `raw` through the variant table, falling back to `raw` itself.
pub fn canonical_label(raw: &str) -> &str {
    LABEL_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == raw)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(raw)
}

/// Normalize raw label counts into a canonical count map.
///
/// The result does not depend on input iteration order, and its total equals
/// the input total. Zero counts are kept.
pub fn normalize_counts<I, K>(counts: I) -> CountMap
where
    I: IntoIterator<Item = (K, Count)>,
    K: AsRef<str>,
{
    let mut merged = CountMap::new();
    for (raw, count) in counts {
        let canonical = canonical_label(raw.as_ref());
        let slot = merged.entry(canonical.to_string()).or_insert(0);
        *slot = slot.saturating_add(count);
    }
    fold_plurals(&mut merged);
    merged
}

/// Sum of all counts in `counts`.
pub fn total_count(counts: &CountMap) -> Count {
    counts.values().fold(0, |acc, count| acc.saturating_add(*count))
}

fn singular_of(key: &str) -> Option<&str> {
    if key.chars().count() > MIN_PLURAL_LEN && key.ends_with(PLURAL_SUFFIX) {
        Some(&key[..key.len() - PLURAL_SUFFIX.len_utf8()])
    } else {
        None
    }
}

// Longest keys fold first so chains ("xss" -> "xs" -> "x") collapse fully.
fn fold_plurals(merged: &mut CountMap) {
    let mut plurals: Vec<Label> = merged
        .keys()
        .filter(|key| singular_of(key).is_some_and(|singular| merged.contains_key(singular)))
        .cloned()
        .collect();
    plurals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    for plural in plurals {
        let Some(count) = merged.remove(&plural) else {
            continue;
        };
        let Some(singular) = singular_of(&plural) else {
            continue;
        };
        let slot = merged.entry(singular.to_string()).or_insert(0);
        *slot = slot.saturating_add(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, Count)]) -> CountMap {
        entries
            .iter()
            .map(|(label, count)| (label.to_string(), *count))
            .collect()
    }

    #[test]
    fn plural_variant_merges_into_singular() {
        let normalized = normalize_counts([("lions", 3), ("lion", 2)]);
        assert_eq!(normalized, counts(&[("lion", 5)]));
    }

    #[test]
    fn variant_table_resolves_irregular_forms() {
        let normalized = normalize_counts([
            ("wolves", 1),
            ("puppies", 2),
            ("doggo", 1),
            ("polarbear", 4),
            ("tigress", 1),
        ]);
        assert_eq!(
            normalized,
            counts(&[("bear", 4), ("dog", 3), ("tiger", 1), ("wolf", 1)])
        );
    }

    #[test]
    fn unknown_keys_pass_through() {
        let normalized = normalize_counts([("unicorn", 2), ("owl", 1)]);
        assert_eq!(normalized, counts(&[("owl", 1), ("unicorn", 2)]));
    }

    #[test]
    fn unknown_plural_folds_only_when_singular_present() {
        let lone = normalize_counts([("otters", 2)]);
        assert_eq!(lone, counts(&[("otters", 2)]));

        let paired = normalize_counts([("otters", 2), ("otter", 1)]);
        assert_eq!(paired, counts(&[("otter", 3)]));
    }

    #[test]
    fn variant_table_takes_precedence_over_plural_folding() {
        // Resolved by the table even though "cat" never appears on its own.
        let normalized = normalize_counts([("cats", 2), ("foxes", 1)]);
        assert_eq!(normalized, counts(&[("cat", 2), ("fox", 1)]));
    }

    #[test]
    fn short_keys_are_not_plurals() {
        let normalized = normalize_counts([("as", 1), ("a", 1)]);
        assert_eq!(normalized, counts(&[("a", 1), ("as", 1)]));
    }

    #[test]
    fn plural_chains_collapse_fully() {
        let normalized = normalize_counts([("moss", 1), ("mos", 2), ("mo", 3)]);
        assert_eq!(normalized, counts(&[("mo", 6)]));
    }

    #[test]
    fn zero_counts_are_retained() {
        let normalized = normalize_counts([("cat", 0), ("dog", 1)]);
        assert_eq!(normalized, counts(&[("cat", 0), ("dog", 1)]));
        assert_eq!(total_count(&normalized), 1);
    }

    #[test]
    fn canonical_label_falls_back_to_input() {
        assert_eq!(canonical_label("feline"), "cat");
        assert_eq!(canonical_label("cat"), "cat");
        assert_eq!(canonical_label("Feline"), "Feline");
    }
}
