// db/directory.rs
use std::sync::Arc;

use super::{
    outboxdb::OutboxExt, reviewdb::ReviewRecordExt, verificationdb::VerificationRequestExt,
    workerdb::WorkerProfileExt,
};
use crate::service::document_storage::DocumentStorage;

/// Explicitly injected directory of collaborator endpoints. Every
/// cross-component call goes through a named field here; nothing reads
/// collaborator addresses from ambient process state.
///
/// The three stores are independently owned: there is no transaction that
/// spans more than one of them.
#[derive(Clone)]
pub struct Directory {
    pub workers: Arc<dyn WorkerProfileExt>,
    pub requests: Arc<dyn VerificationRequestExt>,
    pub reviews: Arc<dyn ReviewRecordExt>,
    pub outbox: Arc<dyn OutboxExt>,
    pub documents: Arc<dyn DocumentStorage>,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory").finish_non_exhaustive()
    }
}
