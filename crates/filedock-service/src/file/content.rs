//! Version content streaming.

use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::access::{AccessControl, ProjectRole};
use filedock_core::traits::storage::ByteStream;
use filedock_database::store::{FileStore, VersionIndex};
use filedock_storage::VersionStore;

use crate::context::RequestContext;

/// Which version of a file to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The file's `current_version`.
    Latest,
    /// A specific version number.
    Number(i32),
}

impl FromStr for VersionSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        match s.parse::<i32>() {
            Ok(n) if n >= 1 => Ok(Self::Number(n)),
            _ => Err(AppError::validation(format!(
                "Invalid version selector '{s}'"
            ))),
        }
    }
}

/// Streams version blobs to callers.
#[derive(Clone)]
pub struct ContentService {
    files: Arc<dyn FileStore>,
    versions: Arc<dyn VersionIndex>,
    store: Arc<VersionStore>,
    access: Arc<dyn AccessControl>,
}

impl std::fmt::Debug for ContentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService").finish()
    }
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(
        files: Arc<dyn FileStore>,
        versions: Arc<dyn VersionIndex>,
        store: Arc<VersionStore>,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            files,
            versions,
            store,
            access,
        }
    }

    /// Read the content of a file version as a byte stream.
    ///
    /// A version whose blob has been reclaimed by the sweeper reads as
    /// not-found, exactly like one that never existed.
    pub async fn get_content(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<ByteStream> {
        self.access
            .check_access(ctx.user_id, project_id, ProjectRole::Contributor)
            .await?;

        let file = self
            .files
            .find(project_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File does not exist"))?;

        let version_number = match selector {
            VersionSelector::Latest => file.current_version,
            VersionSelector::Number(n) => n,
        };

        let version = self
            .versions
            .find(file_id, version_number)
            .await?
            .ok_or_else(|| AppError::not_found("Version does not exist"))?;
        if version.deleted {
            return Err(AppError::not_found("Version has been deleted"));
        }

        self.store
            .get_version(project_id, file_id, version_number)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parses_latest_and_numbers() {
        assert_eq!(
            "latest".parse::<VersionSelector>().unwrap(),
            VersionSelector::Latest
        );
        assert_eq!(
            "3".parse::<VersionSelector>().unwrap(),
            VersionSelector::Number(3)
        );
    }

    #[test]
    fn test_selector_rejects_garbage() {
        assert!("0".parse::<VersionSelector>().is_err());
        assert!("-1".parse::<VersionSelector>().is_err());
        assert!("two".parse::<VersionSelector>().is_err());
    }
}
