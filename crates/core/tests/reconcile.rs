// Reconciliation scenarios and property tests.

use std::collections::HashSet;

use geocols_core::{reconcile, ColumnClass, ReconcileError, ReferenceSchema, Session};
use proptest::prelude::*;

fn schema(names: &[&str]) -> ReferenceSchema {
    ReferenceSchema::from_columns(names.iter().copied())
}

fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}

// ===== Scenarios =====

#[test]
fn test_missing_and_extra() {
    let reference = schema(&["Sample", "SiO2", "Al2O3"]);
    let rec = reconcile(&["Sample", "SiO2", "Unknown1"], &reference, None).unwrap();

    assert_eq!(rec.missing, vec!["Al2O3"]);
    assert_eq!(rec.extra, vec!["Unknown1"]);
    assert!(rec.dropped.is_empty());
    assert_eq!(rec.final_order, vec!["Sample", "SiO2", "Al2O3", "Unknown1"]);
}

#[test]
fn test_empty_table_gets_every_reference_column() {
    let names = numbered("col", 70);
    let reference = ReferenceSchema::from_columns(names.clone());
    let actual: Vec<String> = Vec::new();

    let rec = reconcile(&actual, &reference, None).unwrap();
    assert_eq!(rec.missing, names);
    assert!(rec.extra.is_empty());
    assert_eq!(rec.final_order, names);
}

#[test]
fn test_added_label_is_known() {
    let mut session = Session::new(schema(&["Sample", "SiO2"]));
    assert!(session.add_label("Notes").unwrap());

    let rec = reconcile(&["Sample", "Notes"], session.schema(), None).unwrap();
    assert_eq!(rec.classify("Notes"), Some(ColumnClass::Known));
    assert!(rec.extra.is_empty());
    assert_eq!(rec.final_order, vec!["Sample", "SiO2", "Notes"]);
}

#[test]
fn test_label_not_added_is_extra() {
    let rec = reconcile(&["Sample", "Notes"], &schema(&["Sample", "SiO2"]), None).unwrap();
    assert_eq!(rec.classify("Notes"), Some(ColumnClass::Extra));
}

#[test]
fn test_canonical_schema_order() {
    let reference = ReferenceSchema::canonical();
    let rec = reconcile(&["Ba", "Mystery", "Sample"], &reference, None).unwrap();

    assert_eq!(rec.final_order.len(), reference.len() + 1);
    assert_eq!(rec.final_order[0], "Sample");
    assert_eq!(rec.final_order.last().map(String::as_str), Some("Mystery"));
    assert_eq!(rec.missing.len(), reference.len() - 2);
}

#[test]
fn test_chosen_order_drives_output() {
    let reference = schema(&["Sample", "SiO2", "Al2O3", "MgO"]);
    let chosen = vec!["MgO".to_string(), "Sample".to_string()];
    let rec = reconcile(&["Sample", "SiO2", "Lab"], &reference, Some(chosen.as_slice())).unwrap();

    assert_eq!(rec.missing, vec!["MgO"]);
    assert_eq!(rec.dropped, vec!["SiO2"]);
    assert_eq!(rec.final_order, vec!["MgO", "Sample", "Lab"]);
}

#[test]
fn test_duplicate_header_rejected() {
    let err = reconcile(&["Sample", "Sample"], &schema(&["Sample"]), None).unwrap_err();
    assert_eq!(err, ReconcileError::DuplicateColumn("Sample".into()));
}

#[test]
fn test_reconcile_is_idempotent() {
    let reference = schema(&["Sample", "SiO2", "Al2O3"]);
    let first = reconcile(&["Unknown1", "SiO2"], &reference, None).unwrap();
    let second = reconcile(&first.final_order, &reference, None).unwrap();

    assert!(second.missing.is_empty());
    assert_eq!(second.extra, first.extra);
    assert_eq!(second.final_order, first.final_order);
}

// ===== Properties =====

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Reference names `r0..r19`, table names drawn from those plus `x0..x9`.
fn arb_case() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    let reference: Vec<String> = (0..20).map(|i| format!("r{i}")).collect();
    let pool: Vec<String> = reference
        .iter()
        .cloned()
        .chain((0..10).map(|i| format!("x{i}")))
        .collect();
    (
        proptest::sample::subsequence(reference, 0..=20),
        proptest::sample::subsequence(pool, 0..=30).prop_shuffle(),
    )
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn default_order_partitions_columns((reference, actual) in arb_case()) {
        let schema = ReferenceSchema::from_columns(reference.clone());
        let rec = reconcile(&actual, &schema, None).unwrap();

        let actual_set: HashSet<&String> = actual.iter().collect();
        let expected_missing: Vec<String> = reference
            .iter()
            .filter(|c| !actual_set.contains(c))
            .cloned()
            .collect();
        let expected_extra: Vec<String> = actual
            .iter()
            .filter(|c| !schema.contains(c))
            .cloned()
            .collect();

        prop_assert_eq!(&rec.missing, &expected_missing);
        prop_assert_eq!(&rec.extra, &expected_extra);
        prop_assert!(rec.dropped.is_empty());

        // final order = reference, then extras
        let expected_final: Vec<String> = reference.iter().cloned().chain(expected_extra).collect();
        prop_assert_eq!(&rec.final_order, &expected_final);

        // every table column survives exactly once
        let unique: HashSet<&String> = rec.final_order.iter().collect();
        prop_assert_eq!(unique.len(), rec.final_order.len());
        for column in &actual {
            prop_assert!(unique.contains(column));
        }
    }

    #[test]
    fn reconcile_twice_is_stable((reference, actual) in arb_case()) {
        let schema = ReferenceSchema::from_columns(reference);
        let first = reconcile(&actual, &schema, None).unwrap();
        let second = reconcile(&first.final_order, &schema, None).unwrap();

        prop_assert!(second.missing.is_empty());
        prop_assert_eq!(&second.extra, &first.extra);
        prop_assert_eq!(&second.final_order, &first.final_order);
        prop_assert!(second.is_noop());
    }

    #[test]
    fn chosen_order_accounts_for_every_column(
        (reference, actual) in arb_case(),
        seed in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let schema = ReferenceSchema::from_columns(reference.clone());
        let chosen: Vec<String> = if reference.is_empty() {
            Vec::new()
        } else {
            seed.iter().map(|i| i.get(&reference).clone()).collect()
        };
        let rec = reconcile(&actual, &schema, Some(chosen.as_slice())).unwrap();

        for column in &actual {
            let in_output = rec.final_order.contains(column);
            let dropped = rec.dropped.contains(column);
            prop_assert!(in_output != dropped, "{} must be output or dropped", column);
        }
        for column in &rec.missing {
            prop_assert!(chosen.contains(column));
            prop_assert!(!actual.contains(column));
        }
        if let Some(span) = rec.extra_span() {
            prop_assert_eq!(&rec.final_order[span.start() - 1..], rec.extra.as_slice());
        }
    }
}
