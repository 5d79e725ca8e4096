//! `stagediff-recon`: Test-vs-Prod reconciliation of closing and contract-list exports.
//!
//! Pure engine crate: receives raw grids/tables, returns keyed tables and a diff report.
//! No CLI or file IO dependencies.

pub mod cache;
pub mod closing;
pub mod compare;
pub mod config;
pub mod contract_list;
pub mod engine;
pub mod error;
pub mod model;
pub mod number;
pub mod profile;
pub mod table;
pub mod value;

pub use cache::PreparedCache;
pub use closing::prepare_closing;
pub use compare::{nearly_equal, TOLERANCE};
pub use config::CompareConfig;
pub use contract_list::prepare_contract_list;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{Comparison, DiffReport, DiffRow, DiffStatus};
pub use profile::{IdentityProfile, Language, RecordKind};
pub use table::{Grid, Issue, KeyedTable, PreparedTable, RawTable};
pub use value::CellValue;

/// Prepare one side of a comparison from its raw grid.
///
/// Closing exports use the grid as-is (header rows included); contract lists
/// take the first row as their header.
pub fn prepare(grid: Grid, profile: &IdentityProfile) -> Result<PreparedTable, ReconError> {
    match profile.kind {
        RecordKind::Closing => prepare_closing(&grid, profile),
        RecordKind::ContractList => Ok(prepare_contract_list(&RawTable::from_grid(grid), profile)),
    }
}
