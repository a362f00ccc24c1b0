use std::cmp::Ordering;

use cfscan_result::Error;
use cfscan_types::{
    ColumnFamilyTable, CompareOp, DescriptorCatalog, FilterDescriptor, MemDescriptorCatalog,
    ScanRange, SlotType, TableColumn, TupleLayoutBuilder,
};

fn orders_catalog() -> MemDescriptorCatalog {
    let mut catalog = MemDescriptorCatalog::new();
    catalog.register_table(
        ColumnFamilyTable::new("orders")
            .with_column("o", "total")
            .with_column("o", "placed")
            .with_column("c", "name"),
    );
    catalog
        .register_tuple(
            TupleLayoutBuilder::new(3, "orders")
                .slot(30, 0, SlotType::String)
                .slot(31, 1, SlotType::Double)
                .slot(32, 2, SlotType::Timestamp)
                .slot(33, 3, SlotType::String)
                .build(),
        )
        .unwrap();
    catalog
}

#[test]
fn catalog_resolves_every_cell_slot_of_a_tuple() {
    let catalog = orders_catalog();
    let tuple = catalog.tuple_descriptor(3).unwrap();
    tuple.validate().unwrap();

    let key_slot = catalog.row_key_slot(tuple);
    assert_eq!(key_slot, Some(30));

    let cell_slots: Vec<u32> = tuple
        .materialized_slots()
        .map(|slot| slot.id)
        .filter(|&id| Some(id) != key_slot)
        .collect();
    let resolved = catalog.resolve_columns("orders", &cell_slots).unwrap();
    let columns: Vec<String> = resolved
        .iter()
        .map(|col| format!("{}:{}", col.family, col.qualifier))
        .collect();
    assert_eq!(columns, vec!["o:total", "o:placed", "c:name"]);
}

#[test]
fn layout_offsets_stay_inside_tuple_and_aligned() {
    let catalog = orders_catalog();
    let tuple = catalog.tuple_descriptor(3).unwrap();
    for slot in tuple.materialized_slots() {
        assert_eq!(slot.byte_offset % slot.slot_type.alignment(), 0, "slot {}", slot.id);
        assert!(slot.byte_offset >= tuple.num_null_bytes);
        assert!(slot.end_offset() <= tuple.byte_size);
    }
    assert_eq!(tuple.byte_size % 8, 0);
}

#[test]
fn table_columns_sort_like_the_store() {
    let table = orders_catalog();
    let table = table.table("orders").unwrap();
    let mut columns = table.columns().to_vec();
    columns.sort();
    let rendered: Vec<String> = columns.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec![":key", "c:name", "o:placed", "o:total"]);
    assert_eq!(table.position_of("o", "placed"), Some(2));
    assert_eq!(table.column(0), Some(&TableColumn::RowKey));
}

#[test]
fn scan_ranges_are_half_open() {
    let range = ScanRange::between("b", "d");
    assert!(!range.contains(b"a"));
    assert!(range.contains(b"b"));
    assert!(range.contains(b"c\xff"));
    assert!(!range.contains(b"d"));
    assert!(ScanRange::full().contains(b""));
    assert!(ScanRange::stopping_before("b").contains(b"a"));
    assert_eq!(ScanRange::starting_at("k").to_string(), "[k, +inf)");
}

#[test]
fn filter_ops_compare_bytes() {
    let filter = FilterDescriptor::new("o", "total", CompareOp::GreaterOrEqual, "5");
    assert!(filter.op.matches(b"7".as_slice().cmp(filter.constant.as_slice())));
    assert!(!filter.op.matches(Ordering::Less));
    assert!(CompareOp::NotEqual.matches(Ordering::Greater));
    assert_eq!(filter.to_string(), "o:total >= '5'");
}

#[test]
fn missing_tuple_is_schema_error() {
    let catalog = orders_catalog();
    assert!(matches!(catalog.tuple_descriptor(9), Err(Error::SchemaError(_))));
}

#[test]
fn slot_reused_by_another_tuple_of_the_table_is_rejected() {
    let mut catalog = MemDescriptorCatalog::new();
    catalog.register_table(
        ColumnFamilyTable::new("t")
            .with_column("cf", "a")
            .with_column("cf", "b"),
    );
    catalog
        .register_tuple(TupleLayoutBuilder::new(0, "t").slot(2, 2, SlotType::String).build())
        .unwrap();

    let err = catalog
        .register_tuple(TupleLayoutBuilder::new(1, "t").slot(2, 1, SlotType::String).build())
        .unwrap_err();
    assert!(matches!(&err, Error::SchemaError(msg) if msg.contains("slot 2")), "{err:?}");
    assert!(matches!(catalog.tuple_descriptor(1), Err(Error::SchemaError(_))));

    // The surviving registration still resolves slot 2 to its own column.
    let resolved = catalog.resolve_columns("t", &[2]).unwrap();
    assert_eq!(
        (resolved[0].family.as_str(), resolved[0].qualifier.as_str()),
        ("cf", "b")
    );

    // Replacing a tuple under its own id and reusing ids on another table are fine.
    catalog
        .register_tuple(TupleLayoutBuilder::new(0, "t").slot(2, 1, SlotType::String).build())
        .unwrap();
    assert_eq!(catalog.resolve_columns("t", &[2]).unwrap()[0].qualifier, "a");
    catalog
        .register_tuple(TupleLayoutBuilder::new(5, "u").slot(2, 1, SlotType::Int).build())
        .unwrap();
}
