pub mod error;
pub mod memory;
pub mod redb_store;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryKV;
pub use redb_store::RedbStore;
pub use traits::{KVStore, KVStoreExt};
