//! Entity storage behind one interface.
//!
//! Every module talks to [`RecordStore`]. Two adapters implement it with the
//! same semantics: [`SqlRecords`] over the embedded SQL database and
//! [`MemoryRecords`] for running without one. Records are stored as a JSON
//! document plus a handful of extracted columns used for filtering, ordering
//! and uniqueness.

pub mod activity;
pub mod error;
pub mod memory;
pub mod query;
pub mod record;
pub mod schema;
pub mod sql;
pub mod traits;

pub use activity::{Action, ActivityEntry, ActivityLog};
pub use error::StoreError;
pub use memory::MemoryRecords;
pub use query::{Filter, Op, Page, Query};
pub use record::{Record, RecordStoreExt};
pub use schema::{ColumnDef, ColumnKind, TableDef};
pub use sql::SqlRecords;
pub use traits::RecordStore;

pub use kpidash_sql::Value;
