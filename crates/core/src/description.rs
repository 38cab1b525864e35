//! Descriptions attached to resolved ICD-10 codes.

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionError {
    #[error("ICD-10 description is blank")]
    Blank,
}

/// Human-readable name of an ICD-10 code, as reported by the lookup service.
///
/// Never blank. Surrounding whitespace from the service payload is dropped, so priority
/// matching and output see the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    pub fn new(name: impl Into<String>) -> Result<Self, DescriptionError> {
        let name = name.into();
        match name.trim() {
            "" => Err(DescriptionError::Blank),
            trimmed if trimmed.len() == name.len() => Ok(Self(name)),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Description {
    type Error = DescriptionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<Description> for String {
    fn from(description: Description) -> Self {
        description.0
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Description {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
