pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::BlobError;
pub use file::FileStore;
pub use memory::MemoryBlobStore;
pub use traits::{BlobMeta, BlobStore};
