//! The reader side: a forward-only cursor over a composite's children.
//!
//! A [`SporeReader`] hands out children in order, one per `next*` call, and never rewinds.
//! Calls must mirror the `append*` calls the writer made. Reading past the last child fails
//! with [`Error::CursorExhausted`]. Like the builder, a reader is single-owner state.
//!
//! Every typed `next_as*` operation returns `Ok(None)` when the child is the null sentinel,
//! without invoking the supplied decode function.
//!
//! ## Collections
//!
//! ```rust
//! use spore::{Elements, Freeze, SporeBuilder, Thaw};
//!
//! let empty: Vec<String> = Vec::new();
//! let spore = SporeBuilder::new()
//!     .append_as_collection(None::<&Vec<String>>, |s| s.freeze())
//!     .append_as_collection(Some(&empty), |s| s.freeze())
//!     .append_as_collection(Some(&vec!["x".to_string()]), |s| s.freeze())
//!     .build();
//!
//! let mut reader = spore.reader();
//! assert!(matches!(reader.next_elements().unwrap(), Elements::Absent));
//! assert!(matches!(reader.next_elements().unwrap(), Elements::Empty));
//! assert_eq!(reader.next_as_list(String::thaw).unwrap(), Some(vec!["x".to_string()]));
//! assert!(reader.is_exhausted());
//! ```

use crate::freeze::{Ordinal, Sporable, Thaw};
use crate::locale::Locale;
use crate::registry::{ResolveHints, TypeResolver};
use crate::spore::Spore;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::hash::Hash;
use uuid::Uuid;

/// Forward-only cursor over the children of one spore.
#[derive(Clone, Debug)]
pub struct SporeReader<'a> {
    children: &'a [Spore],
    position: usize,
}

/// The three distinguishable states of an encoded collection.
#[derive(Clone, Debug)]
pub enum Elements<'a> {
    /// The collection was null.
    Absent,
    /// The collection was present with no elements.
    Empty,
    /// A reader over the collection's elements.
    Present(SporeReader<'a>),
}

impl<'a> Elements<'a> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Elements::Absent)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Elements::Empty)
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Elements::Present(_))
    }

    /// Reader over the elements; an empty collection yields an exhausted reader.
    #[must_use]
    pub fn into_reader(self) -> Option<SporeReader<'a>> {
        match self {
            Elements::Absent => None,
            Elements::Empty => Some(SporeReader::over(&[])),
            Elements::Present(reader) => Some(reader),
        }
    }
}

/// Lazily decodes the elements of a collection.
pub struct Thawed<'a, F> {
    reader: SporeReader<'a>,
    decode: F,
}

impl<'a, T, F> Iterator for Thawed<'a, F>
where
    F: FnMut(&'a Spore) -> Result<T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next().map(&mut self.decode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.reader.remaining();
        (remaining, Some(remaining))
    }
}

impl<'a> SporeReader<'a> {
    /// Opens a reader over the children of `spore`. An atomic spore has none.
    pub fn new(spore: &'a Spore) -> Self {
        Self::over(spore.children())
    }

    fn over(children: &'a [Spore]) -> Self {
        SporeReader {
            children,
            position: 0,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.children.len()
    }

    /// Number of children consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.children.len() - self.position
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.has_next()
    }

    /// Consumes the next child as a raw spore.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] when every child has been consumed.
    pub fn next_spore(&mut self) -> Result<&'a Spore> {
        let child = self
            .children
            .get(self.position)
            .ok_or(Error::CursorExhausted {
                consumed: self.position,
            })?;
        self.position += 1;
        Ok(child)
    }

    /// Opens a reader over the next child, or returns `None` when none remain.
    pub fn next_reader_if_present(&mut self) -> Option<SporeReader<'a>> {
        self.next().map(SporeReader::new)
    }

    /// Decodes the next child from its text; composites pass their frozen form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or whatever `decode` returns.
    pub fn next_as_from_str<T, F>(&mut self, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let child = self.next_spore()?;
        match child {
            _ if child.is_payload_null() => Ok(None),
            Spore::Atomic(payload) => decode(payload.as_str()).map(Some),
            Spore::Composite(_) => decode(&child.to_frozen()).map(Some),
        }
    }

    /// Decodes the next child with a function over the spore itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or whatever `decode` returns.
    pub fn next_as_from_spore<T, F>(&mut self, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(&'a Spore) -> Result<T>,
    {
        let child = self.next_spore()?;
        if child.is_payload_null() {
            Ok(None)
        } else {
            decode(child).map(Some)
        }
    }

    /// Decodes the next child with its [`Thaw`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`], [`Error::InvalidValue`] or another thaw error.
    pub fn next_as<T: Thaw>(&mut self) -> Result<Option<T>> {
        self.next_as_from_spore(T::thaw)
    }

    pub fn next_as_string(&mut self) -> Result<Option<String>> {
        self.next_as()
    }

    pub fn next_as_i32(&mut self) -> Result<Option<i32>> {
        self.next_as()
    }

    pub fn next_as_i64(&mut self) -> Result<Option<i64>> {
        self.next_as()
    }

    pub fn next_as_f64(&mut self) -> Result<Option<f64>> {
        self.next_as()
    }

    pub fn next_as_bool(&mut self) -> Result<Option<bool>> {
        self.next_as()
    }

    pub fn next_as_locale(&mut self) -> Result<Option<Locale>> {
        self.next_as()
    }

    pub fn next_as_uuid(&mut self) -> Result<Option<Uuid>> {
        self.next_as()
    }

    pub fn next_as_date(&mut self) -> Result<Option<NaiveDate>> {
        self.next_as()
    }

    /// Decodes an enum from its stored ordinal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrdinal`] if the position is outside the enum.
    pub fn next_as_ordinal<E: Ordinal>(&mut self) -> Result<Option<E>> {
        let Some(ordinal) = self.next_as::<usize>()? else {
            return Ok(None);
        };
        E::from_ordinal(ordinal)
            .map(Some)
            .ok_or(Error::InvalidOrdinal {
                ordinal,
                type_name: std::any::type_name::<E>(),
            })
    }

    /// Consumes the next child as a collection holder.
    ///
    /// A non-sentinel atomic counts as a present collection with no elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] when no child remains.
    pub fn next_elements(&mut self) -> Result<Elements<'a>> {
        let child = self.next_spore()?;
        Ok(if child.is_payload_null() {
            Elements::Absent
        } else if child.is_empty_collection() {
            Elements::Empty
        } else {
            Elements::Present(SporeReader::new(child))
        })
    }

    /// Lazily decodes the next collection; `None` when it was null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] when no child remains. Element errors surface
    /// through the iterator.
    pub fn next_as_iter<T, F>(&mut self, decode: F) -> Result<Option<Thawed<'a, F>>>
    where
        F: FnMut(&'a Spore) -> Result<T>,
    {
        Ok(self
            .next_elements()?
            .into_reader()
            .map(|reader| Thawed { reader, decode }))
    }

    /// Decodes the next collection into any container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or the first element error.
    pub fn next_as_collection<C, T, F>(&mut self, decode: F) -> Result<Option<C>>
    where
        C: FromIterator<T>,
        F: FnMut(&'a Spore) -> Result<T>,
    {
        self.next_as_iter(decode)?
            .map(|elements| elements.collect::<Result<C>>())
            .transpose()
    }

    pub fn next_as_list<T, F>(&mut self, decode: F) -> Result<Option<Vec<T>>>
    where
        F: FnMut(&'a Spore) -> Result<T>,
    {
        self.next_as_collection(decode)
    }

    /// Decodes the next collection into a set; duplicates collapse.
    pub fn next_as_set<T, F>(&mut self, decode: F) -> Result<Option<HashSet<T>>>
    where
        T: Eq + Hash,
        F: FnMut(&'a Spore) -> Result<T>,
    {
        self.next_as_collection(decode)
    }

    /// Decodes the next collection, dropping null elements and elements decoded to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or the first element error.
    pub fn next_as_collection_excluding_null<C, T, F>(&mut self, mut decode: F) -> Result<Option<C>>
    where
        C: FromIterator<T>,
        F: FnMut(&'a Spore) -> Result<Option<T>>,
    {
        let Some(elements) = self.next_elements()?.into_reader() else {
            return Ok(None);
        };
        elements
            .filter(|element| !element.is_payload_null())
            .filter_map(|element| decode(element).transpose())
            .collect::<Result<C>>()
            .map(Some)
    }

    /// Decodes the next interleaved map with separate key and value decoders.
    ///
    /// Null keys and values come through as `None` without reaching the decoders. On key
    /// collisions the container's own insertion rule applies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousMapEncoding`] if the member count is odd.
    pub fn next_as_map_with<M, K, V, KF, VF>(
        &mut self,
        mut decode_key: KF,
        mut decode_value: VF,
    ) -> Result<Option<M>>
    where
        M: FromIterator<(Option<K>, Option<V>)>,
        KF: FnMut(&'a Spore) -> Result<K>,
        VF: FnMut(&'a Spore) -> Result<V>,
    {
        let Some(members) = self.next_map_members()? else {
            return Ok(None);
        };
        members
            .chunks_exact(2)
            .map(|pair| {
                let key = thaw_unless_null(&pair[0], &mut decode_key)?;
                let value = thaw_unless_null(&pair[1], &mut decode_value)?;
                Ok((key, value))
            })
            .collect::<Result<M>>()
            .map(Some)
    }

    /// Decodes the next interleaved map with [`Thaw`] keys and values.
    ///
    /// Use `Option<K>` or `Option<V>` to accept null members.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousMapEncoding`] if the member count is odd, or a thaw error.
    pub fn next_as_map<K, V, M>(&mut self) -> Result<Option<M>>
    where
        K: Thaw,
        V: Thaw,
        M: FromIterator<(K, V)>,
    {
        let Some(members) = self.next_map_members()? else {
            return Ok(None);
        };
        members
            .chunks_exact(2)
            .map(|pair| Ok((K::thaw(&pair[0])?, V::thaw(&pair[1])?)))
            .collect::<Result<M>>()
            .map(Some)
    }

    fn next_map_members(&mut self) -> Result<Option<&'a [Spore]>> {
        let Some(reader) = self.next_elements()?.into_reader() else {
            return Ok(None);
        };
        let members = reader.children;
        if members.len() % 2 != 0 {
            return Err(Error::AmbiguousMapEncoding { len: members.len() });
        }
        Ok(Some(members))
    }

    /// Hands the next raw child, null included, to an existing instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or the instance's populate error.
    pub fn parse_next_into<S: Sporable + ?Sized>(&mut self, target: &mut S) -> Result<&mut Self> {
        let child = self.next_spore()?;
        target.populate_from_spore(child)?;
        Ok(self)
    }

    /// Creates an instance with `factory` and populates it from the next child.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorExhausted`] or the instance's populate error.
    pub fn next_as_sporable<S, F>(&mut self, factory: F) -> Result<Option<S>>
    where
        S: Sporable,
        F: FnOnce() -> S,
    {
        self.next_as_sporable_versioned(|_| factory())
    }

    /// Like [`SporeReader::next_as_sporable`], but the factory sees the child's version.
    ///
    /// # Errors
    ///
    /// Also returns [`Error::MissingMetadataEntry`] if the child has metadata without a version.
    pub fn next_as_sporable_versioned<S, F>(&mut self, factory: F) -> Result<Option<S>>
    where
        S: Sporable,
        F: FnOnce(Option<&str>) -> S,
    {
        self.next_as_from_spore(|child| {
            let mut instance = factory(child.version()?);
            instance.populate_from_spore(child)?;
            Ok(instance)
        })
    }

    /// Instantiates the next child through `resolver`, using its embedded unique identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadata`], [`Error::TypeResolutionFailed`],
    /// [`Error::TypeResolutionAmbiguous`], [`Error::InstantiationFailed`] or a populate error.
    pub fn next_as_automatic<T, R>(&mut self, resolver: &R) -> Result<Option<Box<T>>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        self.next_as_automatic_with_hints(resolver, &ResolveHints::default())
    }

    pub fn next_as_automatic_with_hints<T, R>(
        &mut self,
        resolver: &R,
        hints: &ResolveHints,
    ) -> Result<Option<Box<T>>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        self.next_as_from_spore(|child| child.to_instance_with_hints(resolver, hints))
    }
}

fn thaw_unless_null<'a, T, F>(spore: &'a Spore, decode: &mut F) -> Result<Option<T>>
where
    F: FnMut(&'a Spore) -> Result<T>,
{
    if spore.is_payload_null() {
        Ok(None)
    } else {
        decode(spore).map(Some)
    }
}

impl<'a> Iterator for SporeReader<'a> {
    type Item = &'a Spore;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_spore().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for SporeReader<'_> {}
