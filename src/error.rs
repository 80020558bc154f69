//! Error types for freezing and thawing spores.
//!
//! Every failure in this crate is immediate and final: a decode either produces a complete
//! tree or an [`Error`], never a partial result. Callers should treat decode failures as
//! corrupt or incompatible input rather than transient conditions.
//!
//! ## Error Categories
//!
//! - **Wire format**: [`Error::MalformedFrozenString`], [`Error::AmbiguousMapEncoding`],
//!   [`Error::DepthLimitExceeded`]
//! - **Cursor misuse**: [`Error::CursorExhausted`]
//! - **Typed decode**: [`Error::InvalidValue`], [`Error::InvalidOrdinal`], [`Error::UnexpectedNull`]
//! - **Type-directed instantiation**: [`Error::MissingMetadata`], [`Error::MissingMetadataEntry`],
//!   [`Error::TypeResolutionFailed`], [`Error::TypeResolutionAmbiguous`],
//!   [`Error::InstantiationFailed`]
//!
//! ## Examples
//!
//! ```rust
//! use spore::{SporeBuilder, SporeReader, Error};
//!
//! let spore = SporeBuilder::new().append("only one").build();
//! let mut reader = SporeReader::new(&spore);
//!
//! assert_eq!(reader.next_as_string().unwrap().as_deref(), Some("only one"));
//! assert!(matches!(reader.next_as_string(), Err(Error::CursorExhausted { consumed: 1 })));
//! ```

use crate::metadata::MetadataKind;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while freezing or thawing a spore.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The frozen string has delimiters the tokenizer cannot pair up.
    #[error("Malformed frozen spore {input:?}: {reason}")]
    MalformedFrozenString { input: String, reason: String },

    /// A flattened map carried an odd number of members.
    #[error("Ambiguous map encoding: {len} members cannot be read as key/value pairs")]
    AmbiguousMapEncoding { len: usize },

    /// Type-directed instantiation was requested on a spore without a usable unique identifier.
    #[error("No metadata present in the spore, cannot tell which type to instantiate")]
    MissingMetadata,

    /// Metadata is present but does not carry the requested entry.
    #[error("Metadata has no {0} entry")]
    MissingMetadataEntry(MetadataKind),

    /// The registry has no type for the identifier.
    #[error("Could not find a sporable type for identifier {unique_identifier:?}")]
    TypeResolutionFailed { unique_identifier: String },

    /// The registry has several types for the identifier.
    #[error("Identifier {unique_identifier:?} is ambiguous, candidates: {candidates:?}")]
    TypeResolutionAmbiguous {
        unique_identifier: String,
        candidates: Vec<String>,
    },

    /// The resolved type could not be constructed.
    #[error("Could not instantiate {type_name}: {reason}")]
    InstantiationFailed { type_name: String, reason: String },

    /// A `next_*` call was made after every child had been consumed.
    #[error("Spore cursor exhausted after {consumed} members")]
    CursorExhausted { consumed: usize },

    /// A child could not be parsed as the requested primitive.
    #[error("Invalid value: expected {expected}, found {found:?}")]
    InvalidValue { expected: String, found: String },

    /// A stored ordinal does not index into the target enum.
    #[error("Ordinal {ordinal} is out of range for {type_name}")]
    InvalidOrdinal {
        ordinal: usize,
        type_name: &'static str,
    },

    /// A non-optional thaw met the null sentinel.
    #[error("Unexpected null payload where {expected} was required")]
    UnexpectedNull { expected: String },

    /// The frozen string nests deeper than the decoder allows.
    #[error("Spore nesting exceeds the configured depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a malformed-input error for the given frozen fragment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::Error;
    ///
    /// let err = Error::malformed("{|a", "unbalanced delimiters");
    /// assert!(err.to_string().contains("unbalanced"));
    /// ```
    pub fn malformed(input: &str, reason: &str) -> Self {
        Error::MalformedFrozenString {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an error for a payload that does not parse as the expected primitive.
    pub fn invalid_value(expected: &str, found: &str) -> Self {
        Error::InvalidValue {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an error for a null payload met by a non-optional thaw.
    pub fn unexpected_null(expected: &str) -> Self {
        Error::UnexpectedNull {
            expected: expected.to_string(),
        }
    }

    pub fn instantiation_failed<T: fmt::Display>(type_name: &str, reason: T) -> Self {
        Error::InstantiationFailed {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::AmbiguousMapEncoding { len: 3 };
        assert!(err.to_string().contains("3 members"));

        let err = Error::MissingMetadataEntry(MetadataKind::UniqueId);
        assert_eq!(err.to_string(), "Metadata has no unique identifier entry");

        let err = Error::InvalidOrdinal {
            ordinal: 9,
            type_name: "Status",
        };
        assert_eq!(err.to_string(), "Ordinal 9 is out of range for Status");
    }

    #[test]
    fn test_serde_custom() {
        let err = <Error as serde::de::Error>::custom("bad field");
        assert_eq!(err, Error::Custom("bad field".to_string()));
    }
}
