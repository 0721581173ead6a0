pub mod decision_service;
pub mod document_storage;
pub mod error;
pub mod listing_service;
pub mod outbox;
pub mod reviewer_sync_service;
pub mod submission_service;

#[cfg(test)]
pub mod testsupport;
