use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("journey store {0} already exists, refusing to overwrite it")]
    AlreadyInitialized(PathBuf),

    #[error("journey store {0} does not exist, initialize it first")]
    MissingStore(PathBuf),

    #[error("stored parameter '{key}' is '{stored}' but the current feed has '{current}'")]
    FeedMismatch {
        key: String,
        stored: String,
        current: String,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
