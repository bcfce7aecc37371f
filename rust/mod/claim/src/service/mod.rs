pub mod attachment;
pub mod claim;
pub mod comment;
pub mod workflow;

use std::sync::Arc;

use kpidash_blob::BlobStore;
use kpidash_core::ServiceError;
use kpidash_store::{ActivityLog, RecordStore, RecordStoreExt};

use crate::model::{ClaimAttachment, ClaimComment, ClaimWorkflow, CustomerClaim};

/// Largest accepted attachment.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ClaimConfig {
    /// Department for claims created without one.
    pub default_department: String,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            default_department: "Genel".to_string(),
        }
    }
}

/// Customer claims with their workflow history, comments and attachments.
pub struct ClaimService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) activity: ActivityLog,
    pub(crate) config: ClaimConfig,
}

impl ClaimService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        activity: ActivityLog,
        config: ClaimConfig,
    ) -> Result<Arc<Self>, ServiceError> {
        store.ensure::<CustomerClaim>()?;
        store.ensure::<ClaimWorkflow>()?;
        store.ensure::<ClaimComment>()?;
        store.ensure::<ClaimAttachment>()?;
        Ok(Arc::new(Self {
            store,
            blobs,
            activity,
            config,
        }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use kpidash_blob::MemoryBlobStore;
    use kpidash_core::{Principal, Role};
    use kpidash_store::{ActivityLog, MemoryRecords, RecordStore, SqlRecords};

    use super::{ClaimConfig, ClaimService};
    use crate::model::ClaimInput;

    pub fn memory_service() -> Arc<ClaimService> {
        service_over(Arc::new(MemoryRecords::new()))
    }

    pub fn sqlite_service() -> Arc<ClaimService> {
        let sql = kpidash_sql::SqliteStore::open_in_memory().unwrap();
        service_over(Arc::new(SqlRecords::new(Arc::new(sql))))
    }

    pub fn service_over(store: Arc<dyn RecordStore>) -> Arc<ClaimService> {
        let activity = ActivityLog::new(store.clone()).unwrap();
        ClaimService::new(store, Arc::new(MemoryBlobStore::new()), activity, ClaimConfig::default()).unwrap()
    }

    pub fn engineer() -> Principal {
        Principal {
            user_id: "u-eng".into(),
            username: "zeynep".into(),
            role: Role::User,
            department: "Kalite".into(),
        }
    }

    pub fn admin() -> Principal {
        Principal {
            user_id: "u-admin".into(),
            username: "admin".into(),
            role: Role::Admin,
            department: "Genel".into(),
        }
    }

    pub fn claim_input(customer: &str) -> ClaimInput {
        ClaimInput {
            customer: customer.into(),
            title: "Çizik yüzey".into(),
            product_code: Some("P-1001".into()),
            description: None,
            department: Some("Kalite".into()),
            severity: None,
            assigned_to: None,
            received_date: Some("2024-05-06".into()),
        }
    }
}
