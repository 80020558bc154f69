//! The writer side: accumulate children, then build an immutable composite.
//!
//! A [`SporeBuilder`] is a single-owner accumulator. It is not internally synchronized; use one
//! builder from one thread at a time. Children keep the order of the `append*` calls, and the
//! reader must consume them in that same order.
//!
//! ## Collections
//!
//! Collections and maps follow a three-way policy so the reader can tell the cases apart:
//!
//! | input | child |
//! |---|---|
//! | `None` | null sentinel `--` |
//! | zero elements | empty-collection sentinel `-e-` |
//! | elements | nested composite of the frozen elements |
//!
//! A map is flattened into `[key1, value1, key2, value2, …]` in iteration order, so on the wire
//! it looks exactly like a list of even length.
//!
//! ```rust
//! use spore::{Freeze, SporeBuilder};
//! use std::collections::BTreeMap;
//!
//! let tags = vec!["a".to_string(), "b".to_string()];
//! let mut limits = BTreeMap::new();
//! limits.insert("max", 10);
//!
//! let spore = SporeBuilder::new()
//!     .version("2")
//!     .append("report")
//!     .append_as_collection(Some(&tags), |tag| tag.freeze())
//!     .append_as_collection(None::<&Vec<String>>, |tag| tag.freeze())
//!     .append_as_map(Some(&limits), |k| k.freeze(), |v| v.freeze())
//!     .build();
//!
//! assert_eq!(
//!     spore.to_string(),
//!     "{|{|spr_|_v2|}_|_report_|_{|a_|_b|}_|_--_|_{|max_|_10|}|}"
//! );
//! ```

use crate::freeze::{Freeze, Ordinal, Sporable, SporeType};
use crate::metadata::Metadata;
use crate::spore::Spore;
use std::fmt;

/// Mutable accumulator for a composite spore.
#[derive(Clone, Default)]
pub struct SporeBuilder {
    version: Option<String>,
    unique_identifier: Option<String>,
    children: Vec<Spore>,
}

impl SporeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder with only the version entry set.
    #[must_use]
    pub fn with_version(version: &str) -> Self {
        SporeBuilder {
            version: Some(version.to_string()),
            ..Self::default()
        }
    }

    /// Starts a builder seeded with the version and unique identifier `T` declares.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::{Result, Spore, SporeBuilder, Sporable, SporeType};
    ///
    /// struct Marker;
    ///
    /// impl SporeType for Marker {
    ///     const UNIQUE_IDENTIFIER: &'static str = "Marker";
    /// }
    ///
    /// impl Sporable for Marker {
    ///     fn assemble_spore(&self) -> Spore {
    ///         SporeBuilder::for_type::<Self>().build()
    ///     }
    ///     fn populate_from_spore(&mut self, _spore: &Spore) -> Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let spore = SporeBuilder::for_type::<Marker>().build();
    /// assert_eq!(spore.to_string(), "{|{|spr_|_uMarker|}|}");
    /// assert_eq!(spore.version().unwrap_err().to_string(), "Metadata has no version entry");
    /// ```
    #[must_use]
    pub fn for_type<T: SporeType + ?Sized>() -> Self {
        SporeBuilder {
            version: T::VERSION.map(str::to_string),
            unique_identifier: Some(T::UNIQUE_IDENTIFIER.to_string()),
            children: Vec::new(),
        }
    }

    /// Sets the version entry. The last call wins.
    pub fn version(&mut self, version: &str) -> &mut Self {
        self.version = Some(version.to_string());
        self
    }

    /// Sets the unique identifier entry. The last call wins.
    pub fn unique_identifier(&mut self, unique_identifier: &str) -> &mut Self {
        self.unique_identifier = Some(unique_identifier.to_string());
        self
    }

    pub fn append_null_payload(&mut self) -> &mut Self {
        self.children.push(Spore::null());
        self
    }

    pub fn append_as_empty_collection(&mut self) -> &mut Self {
        self.children.push(Spore::empty_collection());
        self
    }

    /// Freezes `value` and appends it as one child.
    pub fn append<T: Freeze + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.children.push(value.freeze());
        self
    }

    /// Appends `freeze(value)`, or a null payload when `value` is `None`.
    ///
    /// `freeze` is never called for an absent value.
    pub fn append_with<T, F>(&mut self, value: Option<T>, freeze: F) -> &mut Self
    where
        F: FnOnce(T) -> Spore,
    {
        self.children.push(value.map_or_else(Spore::null, freeze));
        self
    }

    pub fn append_spore(&mut self, spore: Spore) -> &mut Self {
        self.children.push(spore);
        self
    }

    /// Appends the tree another builder would produce right now.
    pub fn append_builder(&mut self, builder: &SporeBuilder) -> &mut Self {
        self.children.push(builder.build());
        self
    }

    pub fn append_sporable<S: Sporable + ?Sized>(&mut self, sporable: &S) -> &mut Self {
        self.children.push(sporable.assemble_spore());
        self
    }

    /// Appends an enum as its zero-based declaration position.
    pub fn append_ordinal<E: Ordinal>(&mut self, value: &E) -> &mut Self {
        self.children.push(Spore::Atomic(value.ordinal().to_string()));
        self
    }

    /// Appends a collection with the null, empty and populated cases kept apart.
    ///
    /// A `None` element frozen by `freeze` becomes a null child inside the nested composite,
    /// never a null collection.
    pub fn append_as_collection<I, F>(&mut self, items: Option<I>, freeze: F) -> &mut Self
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Spore,
    {
        match items {
            Some(items) => self.append_as_stream(items, freeze),
            None => self.append_null_payload(),
        }
    }

    /// Appends a collection that is always present; zero elements give the empty sentinel.
    pub fn append_as_stream<I, F>(&mut self, items: I, freeze: F) -> &mut Self
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Spore,
    {
        let elements: Vec<Spore> = items.into_iter().map(freeze).collect();
        self.push_collection(elements)
    }

    /// Appends a map flattened into interleaved keys and values.
    pub fn append_as_map<I, K, V, KF, VF>(
        &mut self,
        map: Option<I>,
        mut freeze_key: KF,
        mut freeze_value: VF,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        KF: FnMut(K) -> Spore,
        VF: FnMut(V) -> Spore,
    {
        let Some(map) = map else {
            return self.append_null_payload();
        };

        let mut members = Vec::new();
        for (key, value) in map {
            members.push(freeze_key(key));
            members.push(freeze_value(value));
        }
        self.push_collection(members)
    }

    fn push_collection(&mut self, elements: Vec<Spore>) -> &mut Self {
        if elements.is_empty() {
            self.append_as_empty_collection()
        } else {
            self.append_spore(Spore::composite(elements))
        }
    }

    /// Number of children appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Produces the composite. Metadata is attached only if an entry was set.
    #[must_use]
    pub fn build(&self) -> Spore {
        let metadata = Metadata::new(self.version.as_deref(), self.unique_identifier.as_deref());
        match metadata {
            Some(metadata) => Spore::with_metadata(metadata, self.children.clone()),
            None => Spore::composite(self.children.clone()),
        }
    }
}

impl fmt::Debug for SporeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SporeBuilder")
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder() {
        let spore = SporeBuilder::new().build();
        assert_eq!(spore.to_string(), "{||}");
        assert!(spore.metadata().is_none());
    }

    #[test]
    fn test_metadata_in_kind_order() {
        let spore = SporeBuilder::new()
            .unique_identifier("Filter")
            .version("1")
            .version("2")
            .build();
        assert_eq!(spore.to_string(), "{|{|spr_|_v2_|_uFilter|}|}");
    }

    #[test]
    fn test_three_way_collection_policy() {
        let empty: Vec<i32> = Vec::new();
        let spore = SporeBuilder::new()
            .append_as_collection(None::<&Vec<i32>>, |n| n.freeze())
            .append_as_collection(Some(&empty), |n| n.freeze())
            .append_as_collection(Some(&vec![1, 2]), |n| n.freeze())
            .build();
        assert_eq!(spore.to_string(), "{|--_|_-e-_|_{|1_|_2|}|}");
    }

    #[test]
    fn test_collection_of_nulls_is_not_null() {
        let items: Vec<Option<String>> = vec![None, None];
        let spore = SporeBuilder::new()
            .append_as_collection(Some(&items), |item| item.freeze())
            .build();

        let collection = &spore.children()[0];
        assert!(!collection.is_empty());
        assert!(!collection.is_payload_null());
        assert!(collection.children().iter().all(Spore::is_payload_null));
    }

    #[test]
    fn test_append_with_skips_absent() {
        let mut called = false;
        let spore = SporeBuilder::new()
            .append_with(None::<i32>, |n| {
                called = true;
                n.freeze()
            })
            .build();
        assert!(!called);
        assert!(spore.children()[0].is_payload_null());
    }

    #[test]
    fn test_empty_map() {
        let map: Vec<(String, i32)> = Vec::new();
        let spore = SporeBuilder::new()
            .append_as_map(Some(map), |k| k.freeze(), |v| v.freeze())
            .build();
        assert!(spore.children()[0].is_empty_collection());
    }

    #[test]
    fn test_len_and_debug() {
        let mut builder = SporeBuilder::with_version("1");
        builder.append(&1).append(&2);
        assert_eq!(builder.len(), 2);
        assert!(!builder.is_empty());
        assert_eq!(format!("{builder:?}"), "SporeBuilder { children: 2, .. }");
    }
}
