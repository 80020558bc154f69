//! The value tree behind every frozen spore.
//!
//! A [`Spore`] is either an atomic leaf holding a string payload, or a [`Composite`] node
//! holding optional [`Metadata`] and an ordered list of children. Trees are immutable once
//! built and are safe to share across threads.
//!
//! ## Sentinels
//!
//! The wire format is pure text, so absence is spelled out with reserved payloads:
//!
//! - [`NULL_PAYLOAD`] (`--`): the value was absent.
//! - [`EMPTY_COLLECTION_PAYLOAD`] (`-e-`): the collection was present but had no elements.
//!
//! A composite is never null; "no children" and "null" stay distinguishable.
//!
//! ## Examples
//!
//! ```rust
//! use spore::Spore;
//!
//! let spore = Spore::composite(vec![
//!     Spore::atomic("name"),
//!     Spore::null(),
//!     Spore::empty_collection(),
//! ]);
//!
//! assert_eq!(spore.to_string(), "{|name_|_--_|_-e-|}");
//! assert_eq!(spore.to_string().parse::<Spore>().unwrap(), spore);
//! ```

use crate::de::Decoder;
use crate::metadata::{Metadata, MetadataKind};
use crate::options::SporeOptions;
use crate::reader::SporeReader;
use crate::ser::Encoder;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Payload of an atomic spore that stands for an absent value.
pub const NULL_PAYLOAD: &str = "--";

/// Payload of an atomic spore that stands for a present but empty collection.
pub const EMPTY_COLLECTION_PAYLOAD: &str = "-e-";

/// Opens a composite spore.
pub const SPORE_PREFIX: &str = "{|";

/// Closes a composite spore.
pub const SPORE_SUFFIX: &str = "|}";

/// Separates the members of a composite spore.
pub const MEMBER_SEPARATOR: &str = "_|_";

/// Newtype name that lets the serde bridge carry a `Spore` as a tree instead of a string.
pub(crate) const SPORE_TOKEN: &str = "$spore::private::Spore";

/// A node in the spore value tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Spore {
    /// A leaf whose payload is written verbatim. Absence is the [`NULL_PAYLOAD`] sentinel.
    Atomic(String),
    Composite(Composite),
}

/// A composite node: optional metadata plus ordered children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Composite {
    metadata: Option<Metadata>,
    children: Vec<Spore>,
}

impl Composite {
    #[must_use]
    pub fn new(metadata: Option<Metadata>, children: Vec<Spore>) -> Self {
        Composite { metadata, children }
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Spore] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (Option<Metadata>, Vec<Spore>) {
        (self.metadata, self.children)
    }
}

impl Spore {
    /// Returns the null atomic spore (`--`).
    #[must_use]
    pub fn null() -> Self {
        Spore::Atomic(NULL_PAYLOAD.to_string())
    }

    /// Returns the empty-collection atomic spore (`-e-`).
    #[must_use]
    pub fn empty_collection() -> Self {
        Spore::Atomic(EMPTY_COLLECTION_PAYLOAD.to_string())
    }

    #[must_use]
    pub fn atomic(payload: impl Into<String>) -> Self {
        Spore::Atomic(payload.into())
    }

    /// Returns a composite spore without metadata.
    #[must_use]
    pub fn composite(children: Vec<Spore>) -> Self {
        Spore::Composite(Composite::new(None, children))
    }

    #[must_use]
    pub fn with_metadata(metadata: Metadata, children: Vec<Spore>) -> Self {
        Spore::Composite(Composite::new(Some(metadata), children))
    }

    #[inline]
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(self, Spore::Atomic(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Spore::Composite(_))
    }

    /// Returns `true` only for the null atomic. A composite is never null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::Spore;
    ///
    /// assert!(Spore::null().is_payload_null());
    /// assert!(!Spore::empty_collection().is_payload_null());
    /// assert!(!Spore::composite(vec![]).is_payload_null());
    /// ```
    #[must_use]
    pub fn is_payload_null(&self) -> bool {
        matches!(self, Spore::Atomic(payload) if payload == NULL_PAYLOAD)
    }

    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, Spore::Atomic(payload) if payload == EMPTY_COLLECTION_PAYLOAD)
    }

    /// Returns `true` for the empty-collection sentinel and for a childless composite.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Spore::Atomic(_) => self.is_empty_collection(),
            Spore::Composite(composite) => composite.is_empty(),
        }
    }

    /// Returns `true` if this node, read as a holder of one collection, holds nothing.
    ///
    /// That is the case when the node is null, has no children, or its first child is the
    /// null or empty-collection sentinel.
    #[must_use]
    pub fn has_null_or_empty_payload(&self) -> bool {
        if self.is_payload_null() {
            return true;
        }
        match self.children().first() {
            Some(first) => first.is_payload_null() || first.is_empty_collection(),
            None => true,
        }
    }

    /// Returns the payload of an atomic spore.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Spore::Atomic(payload) => Some(payload),
            Spore::Composite(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Spore::Composite(composite) => Some(composite),
            Spore::Atomic(_) => None,
        }
    }

    /// Children of a composite. An atomic spore has none.
    #[must_use]
    pub fn children(&self) -> &[Spore] {
        match self {
            Spore::Composite(composite) => composite.children(),
            Spore::Atomic(_) => &[],
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.as_composite().and_then(Composite::metadata)
    }

    /// Returns the version carried in this spore's metadata.
    ///
    /// `Ok(None)` means the spore has no metadata at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadataEntry`] if metadata is present without a version entry.
    pub fn version(&self) -> Result<Option<&str>> {
        self.metadata_entry(MetadataKind::Version)
    }

    /// Returns the unique type identifier carried in this spore's metadata.
    ///
    /// `Ok(None)` means the spore has no metadata at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadataEntry`] if metadata is present without that entry.
    pub fn unique_identifier(&self) -> Result<Option<&str>> {
        self.metadata_entry(MetadataKind::UniqueId)
    }

    fn metadata_entry(&self, kind: MetadataKind) -> Result<Option<&str>> {
        match self.metadata() {
            Some(metadata) => metadata
                .entry(kind)
                .map(|entry| Some(entry.info()))
                .ok_or(Error::MissingMetadataEntry(kind)),
            None => Ok(None),
        }
    }

    /// Returns `true` if the string has the composite shape `{|…|}`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::Spore;
    ///
    /// assert!(Spore::is_frozen_spore("{|a_|_b|}"));
    /// assert!(Spore::is_frozen_spore("{||}"));
    /// assert!(!Spore::is_frozen_spore("{|a"));
    /// assert!(!Spore::is_frozen_spore("--"));
    /// ```
    #[must_use]
    pub fn is_frozen_spore(frozen: &str) -> bool {
        frozen.len() >= SPORE_PREFIX.len() + SPORE_SUFFIX.len()
            && frozen.starts_with(SPORE_PREFIX)
            && frozen.ends_with(SPORE_SUFFIX)
    }

    /// Decodes a frozen string with default options.
    ///
    /// A string without the composite shape decodes to an atomic spore holding it verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrozenString`] for unbalanced delimiters or a broken
    /// metadata block, and [`Error::DepthLimitExceeded`] for excessive nesting.
    pub fn from_frozen(frozen: &str) -> Result<Self> {
        Self::from_frozen_with_options(frozen, SporeOptions::default())
    }

    /// Decodes a frozen string with custom options.
    ///
    /// # Errors
    ///
    /// Same as [`Spore::from_frozen`].
    pub fn from_frozen_with_options(frozen: &str, options: SporeOptions) -> Result<Self> {
        Decoder::new(options).decode(frozen)
    }

    /// Decodes a spore that travelled as a value inside other data. Such a spore is a member,
    /// never a whole legacy record, so the inline metadata header is not recognised.
    pub(crate) fn from_embedded(frozen: &str) -> Result<Self> {
        let options = SporeOptions::new().with_legacy_inline_metadata(false);
        Self::from_frozen_with_options(frozen, options)
    }

    /// Decodes an optional frozen string; `None` yields the null spore.
    ///
    /// # Errors
    ///
    /// Same as [`Spore::from_frozen`].
    pub fn from_frozen_option(frozen: Option<&str>) -> Result<Self> {
        match frozen {
            Some(frozen) => Self::from_frozen(frozen),
            None => Ok(Spore::null()),
        }
    }

    /// Renders the canonical frozen string.
    #[must_use]
    pub fn to_frozen(&self) -> String {
        let mut encoder = Encoder::new();
        encoder.encode(self);
        encoder.into_inner()
    }

    /// Opens a forward-only reader over this spore's children.
    #[must_use]
    pub fn reader(&self) -> SporeReader<'_> {
        SporeReader::new(self)
    }
}

impl Default for Spore {
    fn default() -> Self {
        Spore::null()
    }
}

impl fmt::Display for Spore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_frozen())
    }
}

impl FromStr for Spore {
    type Err = Error;

    fn from_str(frozen: &str) -> Result<Self> {
        Spore::from_frozen(frozen)
    }
}

impl From<Composite> for Spore {
    fn from(composite: Composite) -> Self {
        Spore::Composite(composite)
    }
}

impl Serialize for Spore {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(SPORE_TOKEN, &self.to_frozen())
    }
}

impl<'de> Deserialize<'de> for Spore {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SporeVisitor;

        impl<'de> Visitor<'de> for SporeVisitor {
            type Value = Spore;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a frozen spore string")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Spore::from_embedded(value).map_err(E::custom)
            }

            fn visit_newtype_struct<D>(
                self,
                deserializer: D,
            ) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_str(self)
            }
        }

        deserializer.deserialize_newtype_struct(SPORE_TOKEN, SporeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_tree_is_send_and_sync() {
        assert_send_sync::<Spore>();
        assert_send_sync::<Composite>();
        assert_send_sync::<Metadata>();
    }

    #[test]
    fn test_null_and_empty_are_distinct() {
        let null = Spore::null();
        let empty = Spore::empty_collection();
        let childless = Spore::composite(vec![]);

        assert!(null.is_payload_null());
        assert!(!null.is_empty());

        assert!(!empty.is_payload_null());
        assert!(empty.is_empty());

        assert!(!childless.is_payload_null());
        assert!(childless.is_empty());
    }

    #[test]
    fn test_accessors_without_metadata() {
        let spore = Spore::composite(vec![Spore::atomic("a")]);
        assert_eq!(spore.version(), Ok(None));
        assert_eq!(spore.unique_identifier(), Ok(None));
        assert_eq!(Spore::atomic("a").version(), Ok(None));
    }

    #[test]
    fn test_accessors_with_partial_metadata() {
        let metadata = Metadata::new(Some("7"), None).unwrap();
        let spore = Spore::with_metadata(metadata, vec![]);
        assert_eq!(spore.version(), Ok(Some("7")));
        assert_eq!(
            spore.unique_identifier(),
            Err(Error::MissingMetadataEntry(MetadataKind::UniqueId))
        );
    }

    #[test]
    fn test_has_null_or_empty_payload() {
        assert!(Spore::null().has_null_or_empty_payload());
        assert!(Spore::composite(vec![]).has_null_or_empty_payload());
        assert!(Spore::composite(vec![Spore::null()]).has_null_or_empty_payload());
        assert!(Spore::composite(vec![Spore::empty_collection()]).has_null_or_empty_payload());
        assert!(!Spore::composite(vec![Spore::atomic("x")]).has_null_or_empty_payload());
    }

    #[test]
    fn test_from_frozen_option() {
        assert!(Spore::from_frozen_option(None).unwrap().is_payload_null());
        assert_eq!(
            Spore::from_frozen_option(Some("abc")).unwrap(),
            Spore::atomic("abc")
        );
    }

    #[test]
    fn test_serde_json_carries_frozen_string() {
        let spore = Spore::composite(vec![Spore::atomic("a"), Spore::null()]);
        let json = serde_json::to_string(&spore).unwrap();
        assert_eq!(json, "\"{|a_|_--|}\"");

        let back: Spore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spore);
    }
}
