// service/testsupport.rs
//
// In-memory implementations of the store traits. Each store mirrors the
// semantics its Postgres sibling gets from the schema, most importantly the
// one-pending-request-per-worker uniqueness, enforced atomically under the
// store lock the way the partial unique index enforces it in Postgres.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    db::{
        directory::Directory,
        outboxdb::OutboxExt,
        reviewdb::{ReviewRecordExt, ReviewerSyncOutcome},
        verificationdb::VerificationRequestExt,
        workerdb::{WorkerFieldPatch, WorkerProfileExt},
        StoreError,
    },
    models::{
        outboxmodels::{OutboxEntry, PropagationIntent},
        reviewmodels::{RatingSummary, ReviewRecord},
        verificationmodels::{RequestSnapshot, RequestStatus, VerificationRequest},
        workermodel::{WorkerProfile, WorkerStatus},
    },
    service::{document_storage::{DocumentStorage, StoredDocument}, outbox::Propagator},
};

fn unavailable() -> StoreError {
    StoreError::Unavailable("store marked unavailable for test".to_string())
}

#[derive(Default)]
pub struct InMemoryWorkerStore {
    pub rows: Mutex<HashMap<Uuid, WorkerProfile>>,
    pub down: AtomicBool,
}

impl InMemoryWorkerStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn seed(&self, worker: WorkerProfile) {
        self.rows.lock().unwrap().insert(worker.id, worker);
    }

    pub fn status_of(&self, worker_id: Uuid) -> Option<WorkerStatus> {
        self.rows.lock().unwrap().get(&worker_id).map(|w| w.status)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerProfileExt for InMemoryWorkerStore {
    async fn create_worker_profile(
        &self,
        user_id: Uuid,
        name: String,
        email: String,
        category: String,
    ) -> Result<WorkerProfile, StoreError> {
        self.check()?;
        let now = Utc::now();
        let worker = WorkerProfile {
            id: Uuid::new_v4(),
            user_id,
            name,
            email,
            photo_url: None,
            category,
            document_url: None,
            document_id: None,
            status: WorkerStatus::Pending,
            joined_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(worker.id, worker.clone());
        Ok(worker)
    }

    async fn get_worker_profile(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<WorkerProfile>, StoreError> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(&worker_id).cloned())
    }

    async fn get_all_worker_profiles(&self) -> Result<Vec<WorkerProfile>, StoreError> {
        self.check()?;
        let mut workers: Vec<_> = self.rows.lock().unwrap().values().cloned().collect();
        workers.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(workers)
    }

    async fn update_worker_fields(
        &self,
        worker_id: Uuid,
        patch: WorkerFieldPatch,
    ) -> Result<WorkerProfile, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let worker = rows.get_mut(&worker_id).ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.name {
            worker.name = name;
        }
        if let Some(photo_url) = patch.photo_url {
            worker.photo_url = Some(photo_url);
        }
        if let Some(category) = patch.category {
            worker.category = category;
        }
        if let Some(document_url) = patch.document_url {
            worker.document_url = Some(document_url);
        }
        if let Some(document_id) = patch.document_id {
            worker.document_id = Some(document_id);
        }
        worker.updated_at = Utc::now();
        Ok(worker.clone())
    }

    async fn set_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let worker = rows.get_mut(&worker_id).ok_or(StoreError::NotFound)?;
        worker.status = status;
        worker.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_worker_profile(&self, worker_id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .remove(&worker_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct InMemoryRequestStore {
    pub rows: Mutex<Vec<VerificationRequest>>,
    pub down: AtomicBool,
}

impl InMemoryRequestStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Inserts a request aged by `age` relative to now, for window tests.
    pub fn seed_aged(&self, worker_id: Uuid, status: RequestStatus, age: Duration) -> Uuid {
        let id = Uuid::new_v4();
        let request_date = Utc::now() - age;
        self.rows.lock().unwrap().push(VerificationRequest {
            id,
            worker_id,
            worker_name: "seeded".to_string(),
            category: "plumbing".to_string(),
            document_url: "https://objects.test/docs/seeded".to_string(),
            document_id: "DOC-SEED".to_string(),
            status,
            review_notes: None,
            request_date,
            review_date: status.is_terminal().then(Utc::now),
        });
        id
    }

    pub fn pending_count(&self, worker_id: Uuid) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.worker_id == worker_id && r.status == RequestStatus::Pending)
            .count()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationRequestExt for InMemoryRequestStore {
    async fn create_verification_request(
        &self,
        snapshot: RequestSnapshot,
    ) -> Result<VerificationRequest, StoreError> {
        self.check()?;
        // Check-then-insert under one lock: the in-memory analogue of the
        // partial unique index on pending requests.
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.worker_id == snapshot.worker_id && r.status == RequestStatus::Pending)
        {
            return Err(StoreError::DuplicatePending(snapshot.worker_id));
        }
        let request = VerificationRequest {
            id: Uuid::new_v4(),
            worker_id: snapshot.worker_id,
            worker_name: snapshot.worker_name,
            category: snapshot.category,
            document_url: snapshot.document_url,
            document_id: snapshot.document_id,
            status: RequestStatus::Pending,
            review_notes: None,
            request_date: Utc::now(),
            review_date: None,
        };
        rows.push(request.clone());
        Ok(request)
    }

    async fn get_verification_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == request_id)
            .cloned())
    }

    async fn list_verification_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        self.check()?;
        let mut requests: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.request_date);
        Ok(requests)
    }

    async fn count_pending_for_worker(&self, worker_id: Uuid) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.pending_count(worker_id) as i64)
    }

    async fn count_requests_since(
        &self,
        worker_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.worker_id == worker_id && r.request_date > since)
            .count() as i64)
    }

    async fn delete_pending_for_worker(&self, worker_id: Uuid) -> Result<u64, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.worker_id == worker_id && r.status == RequestStatus::Pending));
        Ok((before - rows.len()) as u64)
    }

    async fn mark_decided(
        &self,
        request_id: Uuid,
        verdict: RequestStatus,
        notes: Option<String>,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let request = rows
            .iter_mut()
            .find(|r| r.id == request_id && r.status == RequestStatus::Pending);
        Ok(request.map(|r| {
            r.status = verdict;
            r.review_notes = notes;
            r.review_date = Some(Utc::now());
            r.clone()
        }))
    }

    async fn delete_verification_request(&self, request_id: Uuid) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != request_id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReviewStore {
    pub rows: Mutex<Vec<ReviewRecord>>,
    pub down: AtomicBool,
}

impl InMemoryReviewStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn seed_review(&self, reviewer_id: Uuid, target_id: Uuid, rating: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.rows.lock().unwrap().push(ReviewRecord {
            id,
            reviewer_id,
            reviewer_name: "Original Name".to_string(),
            reviewer_photo_url: None,
            target_id,
            rating,
            comment: "seeded review".to_string(),
            edited: false,
            created_at: now,
            updated_at: now,
        });
        id
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewRecordExt for InMemoryReviewStore {
    async fn create_review(
        &self,
        reviewer_id: Uuid,
        reviewer_name: String,
        reviewer_photo_url: Option<String>,
        target_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<ReviewRecord, StoreError> {
        self.check()?;
        let now = Utc::now();
        let review = ReviewRecord {
            id: Uuid::new_v4(),
            reviewer_id,
            reviewer_name,
            reviewer_photo_url,
            target_id,
            rating,
            comment,
            edited: false,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(review.clone());
        Ok(review)
    }

    async fn get_reviews_for_target(
        &self,
        target_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.target_id == target_id)
            .cloned()
            .collect())
    }

    async fn rating_summary(&self, target_id: Uuid) -> Result<RatingSummary, StoreError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let ratings: Vec<i32> = rows
            .iter()
            .filter(|r| r.target_id == target_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(RatingSummary::empty());
        }
        Ok(RatingSummary {
            rating: ratings.iter().sum::<i32>() as f64 / ratings.len() as f64,
            review_count: ratings.len() as i64,
        })
    }

    async fn bulk_update_reviewer_info(
        &self,
        reviewer_id: Uuid,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<ReviewerSyncOutcome, StoreError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let mut matched = 0;
        for review in rows.iter_mut().filter(|r| r.reviewer_id == reviewer_id) {
            matched += 1;
            if let Some(name) = &display_name {
                review.reviewer_name = name.clone();
            }
            if let Some(photo) = &photo_url {
                review.reviewer_photo_url = Some(photo.clone());
            }
            review.updated_at = Utc::now();
        }
        Ok(ReviewerSyncOutcome {
            matched_count: matched,
            modified_count: matched,
        })
    }
}

#[derive(Default)]
pub struct InMemoryOutbox {
    pub entries: Mutex<Vec<OutboxEntry>>,
}

impl InMemoryOutbox {
    pub fn unacked(&self) -> Vec<OutboxEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.acked_at.is_none())
            .cloned()
            .collect()
    }

    /// Pulls an entry's next attempt into the past so a drain pass picks it
    /// up without sleeping through the backoff.
    pub fn make_due(&self) {
        let past = Utc::now() - Duration::seconds(1);
        for entry in self.entries.lock().unwrap().iter_mut() {
            entry.next_attempt_at = past;
        }
    }
}

#[async_trait]
impl OutboxExt for InMemoryOutbox {
    async fn enqueue_intent(&self, intent: &PropagationIntent) -> Result<OutboxEntry, StoreError> {
        let payload = serde_json::to_value(intent)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let entry = OutboxEntry {
            id: Uuid::new_v4(),
            kind: intent.kind().to_string(),
            payload,
            attempts: 0,
            next_attempt_at: Utc::now(),
            last_error: None,
            created_at: Utc::now(),
            acked_at: None,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn due_entries(&self, limit: i64) -> Result<Vec<OutboxEntry>, StoreError> {
        let now = Utc::now();
        let mut due: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.acked_at.is_none() && e.next_attempt_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|e| e.created_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn mark_acked(&self, entry_id: Uuid) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            entry.acked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_failed(
        &self,
        entry_id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            entry.attempts += 1;
            entry.last_error = Some(error.to_string());
            entry.next_attempt_at = next_attempt_at;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDocumentStorage {
    pub uploads: Mutex<Vec<String>>,
    pub down: AtomicBool,
}

impl MockDocumentStorage {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStorage for MockDocumentStorage {
    async fn upload_document(
        &self,
        file_name: &str,
        _content_base64: &str,
    ) -> Result<StoredDocument, StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "object storage marked unavailable for test".to_string(),
            ));
        }
        let object_id = format!("{}-{}", Uuid::new_v4(), file_name);
        self.uploads.lock().unwrap().push(object_id.clone());
        Ok(StoredDocument {
            url: format!("https://objects.test/docs/{}", object_id),
            object_id,
        })
    }
}

/// All four stores plus storage, wired into a [`Directory`] with the concrete
/// handles kept around for seeding and assertions.
pub struct TestHarness {
    pub directory: Arc<Directory>,
    pub workers: Arc<InMemoryWorkerStore>,
    pub requests: Arc<InMemoryRequestStore>,
    pub reviews: Arc<InMemoryReviewStore>,
    pub outbox: Arc<InMemoryOutbox>,
    pub documents: Arc<MockDocumentStorage>,
}

impl TestHarness {
    pub fn new() -> Self {
        let workers = Arc::new(InMemoryWorkerStore::default());
        let requests = Arc::new(InMemoryRequestStore::default());
        let reviews = Arc::new(InMemoryReviewStore::default());
        let outbox = Arc::new(InMemoryOutbox::default());
        let documents = Arc::new(MockDocumentStorage::default());

        let directory = Arc::new(Directory {
            workers: workers.clone(),
            requests: requests.clone(),
            reviews: reviews.clone(),
            outbox: outbox.clone(),
            documents: documents.clone(),
        });

        Self {
            directory,
            workers,
            requests,
            reviews,
            outbox,
            documents,
        }
    }

    pub fn propagator(&self) -> Propagator {
        Propagator::new(self.directory.clone())
    }

    pub fn seed_worker(&self, status: WorkerStatus) -> WorkerProfile {
        let now = Utc::now();
        let worker = WorkerProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            photo_url: Some("https://objects.test/photos/ada.jpg".to_string()),
            category: "electrical".to_string(),
            document_url: None,
            document_id: None,
            status,
            joined_at: now,
            updated_at: now,
        };
        self.workers.seed(worker.clone());
        worker
    }
}
