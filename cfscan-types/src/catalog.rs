//! Descriptor catalog interface and an in-memory implementation.
//!
//! The catalog turns a plan's slot ids into the table columns they read. The
//! scan node only holds the resolved `(slot, family, qualifier)` triples; the
//! catalog keeps ownership of the descriptors themselves.

use cfscan_result::{Error, Result};
use rustc_hash::FxHashMap;

use crate::{
    ColumnFamilyTable, ColumnPos, ROW_KEY_COLUMN_POS, SlotDescriptor, SlotId, TableColumn,
    TupleDescriptor, TupleId,
};

/// A requested non-key slot resolved to its cell column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub slot_id: SlotId,
    pub column_pos: ColumnPos,
    pub family: String,
    pub qualifier: String,
}

/// Source of table and tuple metadata for a scan.
pub trait DescriptorCatalog: Send + Sync {
    fn tuple_descriptor(&self, tuple_id: TupleId) -> Result<&TupleDescriptor>;

    /// Resolve each slot to the `(family, qualifier)` it reads.
    ///
    /// Fails with [`Error::SchemaError`] when a slot is unknown, maps to a
    /// column the table does not define, or maps to the row key.
    fn resolve_columns(&self, table_name: &str, slot_ids: &[SlotId]) -> Result<Vec<ResolvedColumn>>;

    /// Slot that receives the row key, if the tuple requests it.
    fn row_key_slot(&self, tuple_desc: &TupleDescriptor) -> Option<SlotId>;
}

/// In-memory catalog used by tests and embedders that assemble plans by hand.
#[derive(Debug, Default)]
pub struct MemDescriptorCatalog {
    tables: FxHashMap<String, ColumnFamilyTable>,
    tuples: FxHashMap<TupleId, TupleDescriptor>,
}

impl MemDescriptorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_table(&mut self, table: ColumnFamilyTable) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Register a tuple descriptor, replacing any tuple with the same id.
    ///
    /// Slot ids are resolved per table, so a slot id already used by another
    /// tuple of the same table is rejected with [`Error::SchemaError`].
    pub fn register_tuple(&mut self, tuple: TupleDescriptor) -> Result<()> {
        let clash = self
            .tuples
            .values()
            .filter(|other| other.id != tuple.id && other.table_name == tuple.table_name)
            .find_map(|other| {
                tuple
                    .slots
                    .iter()
                    .find(|slot| other.slot(slot.id).is_some())
                    .map(|slot| (other.id, slot.id))
            });
        if let Some((other_id, slot_id)) = clash {
            return Err(Error::SchemaError(format!(
                "slot {slot_id} of tuple {} is already defined by tuple {other_id} of table '{}'",
                tuple.id, tuple.table_name
            )));
        }
        self.tuples.insert(tuple.id, tuple);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&ColumnFamilyTable> {
        self.tables.get(name)
    }

    fn find_slot(&self, table_name: &str, slot_id: SlotId) -> Option<&SlotDescriptor> {
        self.tuples
            .values()
            .filter(|tuple| tuple.table_name == table_name)
            .find_map(|tuple| tuple.slot(slot_id))
    }
}

impl DescriptorCatalog for MemDescriptorCatalog {
    fn tuple_descriptor(&self, tuple_id: TupleId) -> Result<&TupleDescriptor> {
        self.tuples
            .get(&tuple_id)
            .ok_or_else(|| Error::SchemaError(format!("unknown tuple descriptor {tuple_id}")))
    }

    fn resolve_columns(&self, table_name: &str, slot_ids: &[SlotId]) -> Result<Vec<ResolvedColumn>> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| Error::SchemaError(format!("unknown table '{table_name}'")))?;

        slot_ids
            .iter()
            .map(|&slot_id| {
                let slot = self.find_slot(table_name, slot_id).ok_or_else(|| {
                    Error::SchemaError(format!(
                        "slot {slot_id} is not defined for table '{table_name}'"
                    ))
                })?;
                match table.column(slot.column_pos) {
                    Some(TableColumn::Cell { family, qualifier }) => Ok(ResolvedColumn {
                        slot_id,
                        column_pos: slot.column_pos,
                        family: family.clone(),
                        qualifier: qualifier.clone(),
                    }),
                    Some(TableColumn::RowKey) => Err(Error::SchemaError(format!(
                        "slot {slot_id} maps to the row key of '{table_name}', not a cell column"
                    ))),
                    None => Err(Error::SchemaError(format!(
                        "slot {slot_id} maps to column position {} which '{table_name}' does not define",
                        slot.column_pos
                    ))),
                }
            })
            .collect()
    }

    fn row_key_slot(&self, tuple_desc: &TupleDescriptor) -> Option<SlotId> {
        tuple_desc
            .materialized_slots()
            .find(|slot| slot.column_pos == ROW_KEY_COLUMN_POS)
            .map(|slot| slot.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SlotType, TupleLayoutBuilder};

    fn catalog() -> MemDescriptorCatalog {
        let mut catalog = MemDescriptorCatalog::new();
        catalog.register_table(
            ColumnFamilyTable::new("t")
                .with_column("cf", "a")
                .with_column("cf", "b"),
        );
        catalog
            .register_tuple(
                TupleLayoutBuilder::new(0, "t")
                    .slot(10, 0, SlotType::String)
                    .slot(11, 1, SlotType::Int)
                    .slot(12, 2, SlotType::String)
                    .slot(13, 9, SlotType::Int)
                    .build(),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn resolves_cell_columns_in_request_order() {
        let catalog = catalog();
        let resolved = catalog.resolve_columns("t", &[12, 11]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].slot_id, 12);
        assert_eq!((resolved[0].family.as_str(), resolved[0].qualifier.as_str()), ("cf", "b"));
        assert_eq!(resolved[1].column_pos, 1);
    }

    #[test]
    fn row_key_slot_is_column_zero() {
        let catalog = catalog();
        let tuple = catalog.tuple_descriptor(0).unwrap();
        assert_eq!(catalog.row_key_slot(tuple), Some(10));
    }

    #[test]
    fn unknown_column_position_is_schema_error() {
        let catalog = catalog();
        let err = catalog.resolve_columns("t", &[13]).unwrap_err();
        assert!(matches!(err, Error::SchemaError(msg) if msg.contains("position 9")));
    }

    #[test]
    fn unknown_table_and_slot_are_schema_errors() {
        let catalog = catalog();
        assert!(matches!(
            catalog.resolve_columns("missing", &[11]),
            Err(Error::SchemaError(_))
        ));
        assert!(matches!(
            catalog.resolve_columns("t", &[99]),
            Err(Error::SchemaError(_))
        ));
        assert!(matches!(
            catalog.resolve_columns("t", &[10]),
            Err(Error::SchemaError(_))
        ));
        assert!(matches!(catalog.tuple_descriptor(5), Err(Error::SchemaError(_))));
    }
}
