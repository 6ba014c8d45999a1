//! Storage provider implementations.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use filedock_core::config::storage::StorageConfig;
use filedock_core::error::AppError;
use filedock_core::result::AppResult;
use filedock_core::traits::storage::StorageProvider;

/// Build the configured storage provider.
pub async fn from_config(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalStorageProvider::new(&config.local.root_path).await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "s3")]
        "s3" => {
            let provider = s3::S3StorageProvider::new(&config.s3).await?;
            Ok(Arc::new(provider))
        }
        other => Err(AppError::configuration(format!(
            "Unknown storage provider '{other}'"
        ))),
    }
}
