use std::fmt;

/// Errors that can occur during document store operations.
#[derive(Debug)]
pub enum DocStoreError {
    /// An I/O error occurred.
    Io(std::io::Error),
    /// A document payload could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// The supplied identifier is not one this store could have issued.
    InvalidId(String),
    /// An error reported by the MongoDB backend.
    #[cfg(feature = "mongo-store")]
    Mongo(mongodb::error::Error),
}

impl fmt::Display for DocStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "document store IO error: {err}"),
            Self::Serialization(err) => write!(f, "document encoding error: {err}"),
            Self::InvalidId(id) => write!(f, "invalid document id: {id}"),
            #[cfg(feature = "mongo-store")]
            Self::Mongo(err) => write!(f, "MongoDB error: {err}"),
        }
    }
}

impl std::error::Error for DocStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            #[cfg(feature = "mongo-store")]
            Self::Mongo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DocStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DocStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
