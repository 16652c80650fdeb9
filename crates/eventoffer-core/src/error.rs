use eventoffer_storage::StorageError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(detail) => ServiceError::Conflict(detail),
            StorageError::MissingReference(detail) => ServiceError::NotFound(detail),
            other => ServiceError::Storage(other),
        }
    }
}

/// Maps a constraint conflict from the store onto a caller-facing message.
pub(crate) fn conflict_as(message: &'static str) -> impl FnOnce(StorageError) -> ServiceError {
    move |err| match err {
        StorageError::Conflict(_) => ServiceError::Conflict(message.to_string()),
        other => other.into(),
    }
}

/// Maps an insert conflict onto the message for the column that collided.
/// Only the `code` constraint names that column; anything else is the key.
pub(crate) fn insert_conflict(
    code_taken: &'static str,
    id_taken: &'static str,
) -> impl FnOnce(StorageError) -> ServiceError {
    move |err| match err {
        StorageError::Conflict(detail) if detail.contains("code") => {
            ServiceError::Conflict(code_taken.to_string())
        }
        StorageError::Conflict(_) => ServiceError::Conflict(id_taken.to_string()),
        other => other.into(),
    }
}
