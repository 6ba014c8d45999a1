//! Shared test harness: the full engine over in-memory metadata stores and
//! a temp-dir blob store.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use uuid::Uuid;

use filedock_database::memory::{
    InMemoryFileStore, InMemoryProjectDirectory, InMemoryUserDirectory, InMemoryVersionIndex,
};
use filedock_service::RequestContext;
use filedock_service::file::checkout::CheckoutService;
use filedock_service::file::content::{ContentService, VersionSelector};
use filedock_service::file::service::{CreateFileRequest, FileService};
use filedock_service::file::version::VersionService;
use filedock_storage::VersionStore;
use filedock_storage::providers::local::LocalStorageProvider;
use filedock_worker::RetentionSweeper;

use filedock_core::result::AppResult;
use filedock_database::store::VersionIndex;
use filedock_entity::file::FileRecord;

/// A complete engine instance with one seeded project.
pub struct TestEngine {
    pub project_id: Uuid,
    /// Project owner.
    pub owner: Uuid,
    /// Contributors.
    pub alice: Uuid,
    pub bob: Uuid,
    /// A user with no project membership.
    pub outsider: Uuid,

    pub files: Arc<InMemoryFileStore>,
    pub versions: Arc<InMemoryVersionIndex>,
    pub store: Arc<VersionStore>,

    pub file_service: FileService,
    pub checkout: CheckoutService,
    pub content: ContentService,
    pub version_service: VersionService,
    pub sweeper: RetentionSweeper,

    _data_dir: tempfile::TempDir,
}

impl TestEngine {
    pub async fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("tempdir");
        let provider = LocalStorageProvider::new(data_dir.path().to_str().unwrap())
            .await
            .expect("local provider");
        let store = Arc::new(VersionStore::new(Arc::new(provider)));

        let files = Arc::new(InMemoryFileStore::new());
        let versions = Arc::new(InMemoryVersionIndex::new());
        let projects = Arc::new(InMemoryProjectDirectory::new());
        let users = Arc::new(InMemoryUserDirectory::new());

        let project_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let outsider = Uuid::new_v4();

        projects
            .add_project(project_id, owner, vec![alice, bob])
            .await;
        users.add_user(owner, "Olive Owner", "olive@example.com").await;
        users.add_user(alice, "Alice Ames", "alice@example.com").await;
        users.add_user(bob, "Bob Burns", "bob@example.com").await;

        let file_service = FileService::new(
            files.clone(),
            versions.clone(),
            store.clone(),
            projects.clone(),
            users.clone(),
        );
        let checkout = CheckoutService::new(
            files.clone(),
            versions.clone(),
            store.clone(),
            projects.clone(),
            users.clone(),
        );
        let content = ContentService::new(
            files.clone(),
            versions.clone(),
            store.clone(),
            projects.clone(),
        );
        let version_service =
            VersionService::new(files.clone(), versions.clone(), projects.clone());
        let sweeper = RetentionSweeper::new(versions.clone(), store.clone());

        Self {
            project_id,
            owner,
            alice,
            bob,
            outsider,
            files,
            versions,
            store,
            file_service,
            checkout,
            content,
            version_service,
            sweeper,
            _data_dir: data_dir,
        }
    }

    pub fn ctx(&self, user: Uuid) -> RequestContext {
        RequestContext::new(user)
    }

    /// Create a file as the project owner.
    pub async fn create_file(&self, name: &str, content: &str) -> FileRecord {
        self.file_service
            .create_file(
                &self.ctx(self.owner),
                CreateFileRequest {
                    project_id: self.project_id,
                    name: name.to_string(),
                    description: None,
                    tags: vec![],
                    mime_type: Some("text/plain".to_string()),
                    content: Bytes::from(content.to_string()),
                },
            )
            .await
            .expect("create file")
    }

    /// Read a file version fully into memory, as a contributor.
    pub async fn read_content(
        &self,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<Vec<u8>> {
        let mut stream = self
            .content
            .get_content(&self.ctx(self.alice), self.project_id, file_id, selector)
            .await?;
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.expect("stream chunk"));
        }
        Ok(collected)
    }

    /// Backdate a version row by `days` whole days (sweep eligibility).
    pub async fn backdate_version(&self, file_id: Uuid, version_number: i32, days: i64) {
        let mut row = self
            .versions
            .find(file_id, version_number)
            .await
            .expect("find version")
            .expect("version exists");
        row.created_at = row.created_at - chrono::Duration::days(days);
        self.versions.put(row).await;
    }
}
