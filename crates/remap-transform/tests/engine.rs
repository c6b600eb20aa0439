use proptest::prelude::*;

use remap_ingest::compute_unique_values;
use remap_map::MappingRuleStore;
use remap_model::{CellValue, TabularDataset};
use remap_transform::transform;

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[A-D]".prop_map(CellValue::Text),
        (0i64..4).prop_map(CellValue::from),
        any::<bool>().prop_map(CellValue::Bool),
    ]
}

fn dataset_strategy() -> impl Strategy<Value = TabularDataset> {
    proptest::collection::vec(proptest::collection::vec(cell_strategy(), 0..3), 0..30).prop_map(
        |rows| {
            TabularDataset::single_sheet(
                "Sheet1",
                vec![CellValue::text("Id"), CellValue::text("Code")],
                rows,
            )
        },
    )
}

fn keys_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-D0-3]", 0..6)
}

fn store_for(keys: &[String]) -> MappingRuleStore {
    let mut store = MappingRuleStore::new();
    for key in keys {
        store.upsert_manual(key.clone(), format!("mapped-{key}"));
    }
    store
}

proptest! {
    #[test]
    fn counters_are_consistent(dataset in dataset_strategy(), keys in keys_strategy()) {
        let store = store_for(&keys);
        let (output, stats) = transform(&dataset, "Code", &store).expect("column exists");
        prop_assert_eq!(stats.transformed_rows + stats.skipped_rows, stats.total_rows);
        prop_assert!(stats.total_rows <= dataset.row_count());
        prop_assert_eq!(stats.total_rows + stats.absent_rows, dataset.row_count());
        prop_assert_eq!(output.row_count(), dataset.row_count());
    }

    #[test]
    fn transform_is_deterministic(dataset in dataset_strategy(), keys in keys_strategy()) {
        let store = store_for(&keys);
        let first = transform(&dataset, "Code", &store).expect("column exists");
        let second = transform(&dataset, "Code", &store).expect("column exists");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn no_rules_leave_the_column_unchanged(dataset in dataset_strategy()) {
        let (output, stats) = transform(&dataset, "Code", &MappingRuleStore::new())
            .expect("column exists");
        prop_assert_eq!(stats.transformed_rows, 0);
        prop_assert_eq!(output.rows(), dataset.rows());
    }

    #[test]
    fn full_coverage_skips_nothing(dataset in dataset_strategy()) {
        let unique = compute_unique_values(&dataset, "Code").expect("column exists");
        let store = store_for(&unique);
        prop_assert!(store.coverage(&unique).is_complete());
        let (_, stats) = transform(&dataset, "Code", &store).expect("column exists");
        prop_assert_eq!(stats.skipped_rows, 0);
        prop_assert_eq!(stats.transformed_rows, stats.total_rows);
    }

    #[test]
    fn other_columns_are_untouched(dataset in dataset_strategy(), keys in keys_strategy()) {
        let store = store_for(&keys);
        let (output, _) = transform(&dataset, "Code", &store).expect("column exists");
        let before: Vec<_> = dataset.column_cells(0).cloned().collect();
        let after: Vec<_> = output.column_cells(0).cloned().collect();
        prop_assert_eq!(before, after);
    }
}
