//! In-process metadata backends.
//!
//! These back the same traits as the PostgreSQL repositories and are used
//! in tests and single-node deployments. The conditional-write contract of
//! [`FileStore::append_activity`] is upheld by holding the map lock across
//! the compare and the write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectGrant, ProjectRole};
use filedock_core::traits::identity::{IdentityLookup, UserIdentity};
use filedock_entity::file::{FileRecord, FileVersion};

use crate::store::{ActivityAppend, FileStore, VersionIndex};

/// In-memory [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStore {
    files: Arc<Mutex<HashMap<(Uuid, Uuid), FileRecord>>>,
}

impl InMemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn find(&self, project_id: Uuid, file_id: Uuid) -> AppResult<Option<FileRecord>> {
        let files = self.files.lock().await;
        Ok(files
            .get(&(project_id, file_id))
            .filter(|f| !f.is_deleted)
            .cloned())
    }

    async fn find_by_name(&self, project_id: Uuid, name: &str) -> AppResult<Option<FileRecord>> {
        let files = self.files.lock().await;
        Ok(files
            .values()
            .find(|f| f.project_id == project_id && f.name == name && !f.is_deleted)
            .cloned())
    }

    async fn insert(&self, file: &FileRecord) -> AppResult<()> {
        let mut files = self.files.lock().await;
        if files.contains_key(&(file.project_id, file.id)) {
            return Err(AppError::conflict(format!(
                "File '{}' already exists",
                file.name
            )));
        }
        files.insert((file.project_id, file.id), file.clone());
        Ok(())
    }

    async fn list_by_project(&self, project_id: Uuid) -> AppResult<Vec<FileRecord>> {
        let files = self.files.lock().await;
        let mut result: Vec<FileRecord> = files
            .values()
            .filter(|f| f.project_id == project_id && !f.is_deleted)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn update_details(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        name: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> AppResult<bool> {
        let mut files = self.files.lock().await;
        match files.get_mut(&(project_id, file_id)).filter(|f| !f.is_deleted) {
            Some(file) => {
                file.name = name.to_string();
                file.description = description.map(String::from);
                file.tags = tags.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_deleted(&self, project_id: Uuid, file_id: Uuid) -> AppResult<bool> {
        let mut files = self.files.lock().await;
        match files.get_mut(&(project_id, file_id)).filter(|f| !f.is_deleted) {
            Some(file) => {
                file.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_activity(
        &self,
        project_id: Uuid,
        file_id: Uuid,
        expected_len: usize,
        change: ActivityAppend,
    ) -> AppResult<bool> {
        let mut files = self.files.lock().await;
        let Some(file) = files.get_mut(&(project_id, file_id)).filter(|f| !f.is_deleted) else {
            return Ok(false);
        };
        if file.activities.0.len() != expected_len {
            return Ok(false);
        }
        file.activities.0.insert(0, change.activity);
        if let Some(v) = change.new_version {
            file.current_version = v;
        }
        if let Some(t) = change.modified_at {
            file.last_modified_at = Some(t);
        }
        Ok(true)
    }
}

/// In-memory [`VersionIndex`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionIndex {
    versions: Arc<Mutex<HashMap<(Uuid, i32), FileVersion>>>,
}

impl InMemoryVersionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a version row directly (test seeding, e.g. backdating
    /// `created_at`).
    pub async fn put(&self, version: FileVersion) {
        let mut versions = self.versions.lock().await;
        versions.insert((version.file_id, version.version_number), version);
    }
}

#[async_trait]
impl VersionIndex for InMemoryVersionIndex {
    async fn insert(&self, version: &FileVersion) -> AppResult<()> {
        let mut versions = self.versions.lock().await;
        let key = (version.file_id, version.version_number);
        if versions.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Version {} already exists",
                version.version_number
            )));
        }
        versions.insert(key, version.clone());
        Ok(())
    }

    async fn find(&self, file_id: Uuid, version_number: i32) -> AppResult<Option<FileVersion>> {
        let versions = self.versions.lock().await;
        Ok(versions.get(&(file_id, version_number)).cloned())
    }

    async fn list_for_file(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        let versions = self.versions.lock().await;
        let mut result: Vec<FileVersion> = versions
            .values()
            .filter(|v| v.file_id == file_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(result)
    }

    async fn set_retain(
        &self,
        file_id: Uuid,
        version_number: i32,
        retain: bool,
    ) -> AppResult<bool> {
        let mut versions = self.versions.lock().await;
        match versions.get_mut(&(file_id, version_number)) {
            Some(version) => {
                version.retain = retain;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_deleted(&self, file_id: Uuid, version_number: i32) -> AppResult<bool> {
        let mut versions = self.versions.lock().await;
        match versions.get_mut(&(file_id, version_number)) {
            Some(version) => {
                version.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_sweepable(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<FileVersion>> {
        let versions = self.versions.lock().await;
        Ok(versions
            .values()
            .filter(|v| !v.deleted && !v.retain && v.created_at < cutoff)
            .cloned()
            .collect())
    }
}

/// In-memory [`AccessControl`] seeded with explicit project grants.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectDirectory {
    projects: Arc<Mutex<HashMap<Uuid, ProjectGrant>>>,
}

impl InMemoryProjectDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project with its owner and contributors.
    pub async fn add_project(&self, project_id: Uuid, owner_id: Uuid, contributor_ids: Vec<Uuid>) {
        let mut projects = self.projects.lock().await;
        projects.insert(
            project_id,
            ProjectGrant {
                project_id,
                owner_id,
                contributor_ids,
            },
        );
    }
}

#[async_trait]
impl AccessControl for InMemoryProjectDirectory {
    async fn check_access(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        required: ProjectRole,
    ) -> AppResult<ProjectGrant> {
        let projects = self.projects.lock().await;
        let grant = projects
            .get(&project_id)
            .ok_or_else(|| AppError::not_found("Project does not exist"))?;
        if !grant.permits(user_id, required) {
            return Err(AppError::not_authorized("You are not authorized"));
        }
        Ok(grant.clone())
    }
}

/// In-memory [`IdentityLookup`] seeded with explicit users.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<Mutex<HashMap<Uuid, UserIdentity>>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user identity.
    pub async fn add_user(&self, user_id: Uuid, display_name: &str, email: &str) {
        let mut users = self.users.lock().await;
        users.insert(
            user_id,
            UserIdentity {
                user_id,
                display_name: display_name.to_string(),
                email: email.to_string(),
            },
        );
    }
}

#[async_trait]
impl IdentityLookup for InMemoryUserDirectory {
    async fn lookup_users(&self, user_ids: &[Uuid]) -> AppResult<Vec<UserIdentity>> {
        let users = self.users.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedock_entity::file::Activity;
    use sqlx::types::Json;

    fn sample_file(project_id: Uuid) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            project_id,
            name: "part.step".to_string(),
            description: None,
            tags: vec![],
            mime_type: None,
            current_version: 1,
            last_modified_at: None,
            activities: Json(vec![]),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_activity_checks_log_length() {
        let store = InMemoryFileStore::new();
        let project_id = Uuid::new_v4();
        let file = sample_file(project_id);
        store.insert(&file).await.unwrap();

        let actor = Uuid::new_v4();
        let pull = ActivityAppend::record(Activity::pull(actor, 1, None, None));

        // First append against the empty log succeeds.
        assert!(store
            .append_activity(project_id, file.id, 0, pull.clone())
            .await
            .unwrap());

        // A second append computed against the stale length loses the race.
        assert!(!store
            .append_activity(project_id, file.id, 0, pull)
            .await
            .unwrap());

        let stored = store.find(project_id, file.id).await.unwrap().unwrap();
        assert_eq!(stored.activity_log().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_updates_version_and_modified_at() {
        let store = InMemoryFileStore::new();
        let project_id = Uuid::new_v4();
        let file = sample_file(project_id);
        store.insert(&file).await.unwrap();

        let actor = Uuid::new_v4();
        let pulled_at = Utc::now();
        let push = Activity::push(actor, 2, pulled_at, None);
        let pushed_at = push.created_at;

        assert!(store
            .append_activity(project_id, file.id, 0, ActivityAppend::commit(push, 2))
            .await
            .unwrap());

        let stored = store.find(project_id, file.id).await.unwrap().unwrap();
        assert_eq!(stored.current_version, 2);
        assert_eq!(stored.last_modified_at, Some(pushed_at));
    }

    #[tokio::test]
    async fn test_deleted_file_is_invisible() {
        let store = InMemoryFileStore::new();
        let project_id = Uuid::new_v4();
        let file = sample_file(project_id);
        store.insert(&file).await.unwrap();

        assert!(store.mark_deleted(project_id, file.id).await.unwrap());
        assert!(store.find(project_id, file.id).await.unwrap().is_none());
        assert!(store.list_by_project(project_id).await.unwrap().is_empty());
        // Deleting twice reports no row touched.
        assert!(!store.mark_deleted(project_id, file.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweepable_filters_retained_and_deleted() {
        let index = InMemoryVersionIndex::new();
        let file_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let old = Utc::now() - chrono::Duration::days(10);

        let mut retained = FileVersion::new(file_id, project_id, 1, user, old);
        retained.retain = true;
        index.put(retained).await;
        index
            .put(FileVersion::new(file_id, project_id, 2, user, old))
            .await;
        let mut gone = FileVersion::new(file_id, project_id, 3, user, old);
        gone.deleted = true;
        index.put(gone).await;

        let sweepable = index.find_sweepable(Utc::now()).await.unwrap();
        assert_eq!(sweepable.len(), 1);
        assert_eq!(sweepable[0].version_number, 2);
    }
}
