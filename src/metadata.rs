//! Metadata attached to a composite spore.
//!
//! Metadata is an ordered set of entries, at most one per [`MetadataKind`], that travels as
//! the first member of a composite's encoding. Two layouts exist on the wire:
//!
//! - [`MetadataLayout::Nested`]: the canonical form, a nested composite led by the `spr`
//!   marker, e.g. `{|spr_|_v001_|_uFilterModel|}`.
//! - [`MetadataLayout::Inline`]: a legacy header spread over the composite's own leading
//!   members, `v<version>`, a bare `u`, then a type label. Only ever produced by decoding.
//!
//! ## Examples
//!
//! ```rust
//! use spore::Spore;
//!
//! let spore = Spore::from_frozen("{|{|spr_|_v2_|_uInvoice|}_|_42|}").unwrap();
//! let metadata = spore.metadata().unwrap();
//!
//! assert_eq!(metadata.version().unwrap(), "2");
//! assert_eq!(metadata.unique_identifier().unwrap(), "Invoice");
//! ```

use crate::spore::{Spore, EMPTY_COLLECTION_PAYLOAD, NULL_PAYLOAD};
use crate::{Error, Result};
use std::fmt;

/// The kind of a metadata entry, with its fixed wire prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKind {
    /// The `spr` marker that identifies a nested metadata block. Never carries info.
    Prefix,
    Version,
    UniqueId,
}

impl MetadataKind {
    /// Kinds in the order their prefixes are tested against an entry's text.
    const DETECTION_ORDER: [MetadataKind; 3] = [
        MetadataKind::Prefix,
        MetadataKind::Version,
        MetadataKind::UniqueId,
    ];

    /// Returns the literal prefix that opens an entry of this kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::MetadataKind;
    ///
    /// assert_eq!(MetadataKind::Prefix.prefix(), "spr");
    /// assert_eq!(MetadataKind::Version.prefix(), "v");
    /// assert_eq!(MetadataKind::UniqueId.prefix(), "u");
    /// ```
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            MetadataKind::Prefix => "spr",
            MetadataKind::Version => "v",
            MetadataKind::UniqueId => "u",
        }
    }

    fn detect(text: &str) -> Option<Self> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|kind| text.starts_with(kind.prefix()))
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKind::Prefix => write!(f, "prefix"),
            MetadataKind::Version => write!(f, "version"),
            MetadataKind::UniqueId => write!(f, "unique identifier"),
        }
    }
}

/// A single `kind + info` metadata entry. An empty info renders as the bare prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetadataEntry {
    kind: MetadataKind,
    info: String,
}

impl MetadataEntry {
    pub fn new(kind: MetadataKind, info: impl Into<String>) -> Self {
        MetadataEntry {
            kind,
            info: info.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> MetadataKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Parses an entry from its wire text by matching the kind prefixes in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrozenString`] if no kind prefix matches.
    pub fn parse(text: &str) -> Result<Self> {
        let kind = MetadataKind::detect(text)
            .ok_or_else(|| Error::malformed(text, "cannot determine metadata entry kind"))?;
        Ok(MetadataEntry::new(kind, &text[kind.prefix().len()..]))
    }
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.info)
    }
}

/// How a metadata block is laid out on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MetadataLayout {
    /// `{|spr_|_<entry>…|}` as the composite's first member.
    #[default]
    Nested,
    /// Legacy header: `v<version>`, `u`, `<label>` as the composite's first three members.
    Inline { label: String },
}

/// Version and unique-identifier entries attached to a composite spore.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
    layout: MetadataLayout,
}

impl Metadata {
    /// Builds nested metadata from optional entries, in kind order.
    ///
    /// Returns `None` when neither entry is set, since a composite only carries metadata
    /// when at least one entry exists.
    #[must_use]
    pub fn new(version: Option<&str>, unique_identifier: Option<&str>) -> Option<Self> {
        let entries: Vec<MetadataEntry> = [
            (MetadataKind::Version, version),
            (MetadataKind::UniqueId, unique_identifier),
        ]
        .into_iter()
        .filter_map(|(kind, info)| info.map(|info| MetadataEntry::new(kind, info)))
        .collect();

        if entries.is_empty() {
            None
        } else {
            Some(Metadata {
                entries,
                layout: MetadataLayout::Nested,
            })
        }
    }

    /// Builds nested metadata from already-parsed entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrozenString`] if an entry is a second `spr` marker or a
    /// kind appears twice.
    pub fn from_entries(entries: Vec<MetadataEntry>) -> Result<Self> {
        for (index, entry) in entries.iter().enumerate() {
            if entry.kind == MetadataKind::Prefix {
                return Err(Error::malformed(
                    &entry.to_string(),
                    "metadata marker repeated inside a metadata block",
                ));
            }
            if entries[..index].iter().any(|e| e.kind == entry.kind) {
                return Err(Error::malformed(
                    &entry.to_string(),
                    "duplicate metadata entry kind",
                ));
            }
        }

        Ok(Metadata {
            entries,
            layout: MetadataLayout::Nested,
        })
    }

    fn inline(version: &str, label: &str) -> Self {
        Metadata {
            entries: vec![
                MetadataEntry::new(MetadataKind::Version, version),
                MetadataEntry::new(MetadataKind::UniqueId, ""),
            ],
            layout: MetadataLayout::Inline {
                label: label.to_string(),
            },
        }
    }

    /// Entries in wire order, excluding the `spr` marker.
    #[must_use]
    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    #[must_use]
    pub fn layout(&self) -> &MetadataLayout {
        &self.layout
    }

    /// Returns the legacy type label of an inline header.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match &self.layout {
            MetadataLayout::Inline { label } => Some(label),
            MetadataLayout::Nested => None,
        }
    }

    #[must_use]
    pub fn entry(&self, kind: MetadataKind) -> Option<&MetadataEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// Returns the version entry's info.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadataEntry`] if the block has no version entry.
    pub fn version(&self) -> Result<&str> {
        self.required(MetadataKind::Version)
    }

    /// Returns the unique identifier entry's info, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadataEntry`] if the block has no unique identifier entry.
    pub fn unique_identifier(&self) -> Result<&str> {
        self.required(MetadataKind::UniqueId)
    }

    fn required(&self, kind: MetadataKind) -> Result<&str> {
        self.entry(kind)
            .map(MetadataEntry::info)
            .ok_or(Error::MissingMetadataEntry(kind))
    }

    /// Reads a nested metadata block out of a decoded first member.
    ///
    /// A member is a metadata block iff it is a composite whose first child is the atomic
    /// `spr` marker.
    pub(crate) fn from_nested(member: &Spore) -> Result<Option<Self>> {
        let children = match member {
            Spore::Composite(composite) => composite.children(),
            Spore::Atomic(_) => return Ok(None),
        };

        match children.split_first() {
            Some((Spore::Atomic(marker), rest)) if marker == MetadataKind::Prefix.prefix() => {
                let entries = rest
                    .iter()
                    .map(|entry| match entry {
                        Spore::Atomic(text) => MetadataEntry::parse(text),
                        Spore::Composite(_) => Err(Error::malformed(
                            &entry.to_frozen(),
                            "metadata entries must be atomic",
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Metadata::from_entries(entries).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Recognises the legacy inline header among a composite's raw top-level members.
    pub(crate) fn from_inline(members: &[&str]) -> Option<Self> {
        let [version, marker, label, ..] = *members else {
            return None;
        };

        let version = version.strip_prefix(MetadataKind::Version.prefix())?;
        if !is_plain_text(version) || marker != MetadataKind::UniqueId.prefix() {
            return None;
        }
        if !is_plain_text(label) {
            return None;
        }

        Some(Metadata::inline(version, label))
    }

    /// Number of top-level members this block occupies in its composite.
    pub(crate) fn member_count(&self) -> usize {
        match self.layout {
            MetadataLayout::Nested => 1,
            MetadataLayout::Inline { .. } => 3,
        }
    }
}

fn is_plain_text(text: &str) -> bool {
    !text.is_empty()
        && !Spore::is_frozen_spore(text)
        && text != NULL_PAYLOAD
        && text != EMPTY_COLLECTION_PAYLOAD
}
