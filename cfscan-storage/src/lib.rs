//! Cell scanner interface and storage adapters for cfscan.
//!
//! The scan node reads a table through the [`CellScanner`] trait, one row of
//! sorted cells at a time. This crate provides the trait, an in-memory sparse
//! column-family store with a scanner over it, and an instrumented wrapper
//! that counts rows, cells and value bytes for any scanner.

pub mod instrumented;
pub mod mem_scanner;
pub mod mem_store;
pub mod scanner;

pub use instrumented::{InstrumentedCellScanner, ScanIoStats, ScanIoStatsSnapshot};
pub use mem_scanner::MemCellScanner;
pub use mem_store::MemColumnFamilyStore;
pub use scanner::CellScanner;
