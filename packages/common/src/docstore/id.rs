use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DocStoreError;

/// The named collections of the document store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Code documents paired with a game.
    Games,
    /// Code documents paired with a game entry.
    Entries,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Games => "games",
            Self::Entries => "entries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store-assigned document identifier.
///
/// The filesystem backend issues UUIDv7 identifiers in simple form;
/// MongoDB issues ObjectIds in hex form. Either way the value is opaque to
/// callers and only meaningful to the store that generated it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and wrap an identifier previously issued by a store.
    ///
    /// Identifiers are non-empty and ASCII alphanumeric; anything else
    /// (in particular path fragments) is rejected.
    pub fn parse(s: impl Into<String>) -> Result<Self, DocStoreError> {
        let s = s.into();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DocStoreError::InvalidId(s));
        }
        Ok(Self(s))
    }

    /// Wrap an identifier freshly generated by a store backend.
    pub(crate) fn from_generated(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
