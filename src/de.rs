//! Spore deserialization.
//!
//! This module holds both directions of the decode path:
//!
//! - [`Decoder`] turns a frozen string into a [`Spore`] tree, detecting metadata on the way.
//! - [`Deserializer`] is a serde `Deserializer` that thaws a tree into any `T: Deserialize`.
//!
//! ## Decoding
//!
//! A string without the composite shape is an atomic holding the text verbatim. Otherwise the
//! outer delimiters are stripped, the inner text is split into top-level members, and each
//! member is decoded recursively. A first member that decodes to a `{|spr_|_…|}` block becomes
//! the composite's metadata. When enabled, the legacy inline header is recognised on the
//! outermost composite only.
//!
//! ```rust
//! use spore::Spore;
//!
//! let spore = Spore::from_frozen("{|{|spr_|_v1_|_uOrder|}_|_a_|_{|b_|_c|}|}").unwrap();
//! assert_eq!(spore.version().unwrap(), Some("1"));
//! assert_eq!(spore.children().len(), 2);
//! assert_eq!(spore.children()[1].children().len(), 2);
//! ```
//!
//! ## Thawing with serde
//!
//! Structs are positional, so field order on both sides must match.
//!
//! ```rust
//! use serde::Deserialize;
//! use spore::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Filter { name: String, tags: Vec<String>, limit: Option<u32> }
//!
//! let filter: Filter = from_str("{|recent_|_{|a_|_b|}_|_--|}").unwrap();
//! assert_eq!(filter.tags, vec!["a", "b"]);
//! assert_eq!(filter.limit, None);
//! ```

use crate::metadata::Metadata;
use crate::options::SporeOptions;
use crate::spore::{Composite, Spore, SPORE_PREFIX, SPORE_SUFFIX, SPORE_TOKEN};
use crate::tokenizer::split_members;
use crate::{Error, Result};
use log::{debug, trace};
use serde::de::{self, IntoDeserializer};
use std::str::FromStr;

/// Decodes frozen strings into spore trees.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    options: SporeOptions,
}

impl Decoder {
    pub fn new(options: SporeOptions) -> Self {
        Decoder { options }
    }

    #[must_use]
    pub fn options(&self) -> &SporeOptions {
        &self.options
    }

    /// Decodes one frozen string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrozenString`] for unbalanced members or a broken metadata
    /// block, and [`Error::DepthLimitExceeded`] when nesting passes `max_depth`.
    pub fn decode(&self, frozen: &str) -> Result<Spore> {
        self.decode_at(frozen, 0)
    }

    fn decode_at(&self, frozen: &str, depth: usize) -> Result<Spore> {
        if !Spore::is_frozen_spore(frozen) {
            return Ok(Spore::Atomic(frozen.to_string()));
        }
        if let Some(limit) = self.options.max_depth {
            if depth >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }

        let inner = &frozen[SPORE_PREFIX.len()..frozen.len() - SPORE_SUFFIX.len()];
        let members = split_members(inner)?;
        trace!("decoding composite at depth {depth} with {} members", members.len());

        let mut children = members
            .iter()
            .map(|member| self.decode_at(member, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        let metadata = self.detect_metadata(&members, &children, depth)?;
        if let Some(metadata) = &metadata {
            children.drain(..metadata.member_count());
        }

        Ok(Spore::Composite(Composite::new(metadata, children)))
    }

    fn detect_metadata(
        &self,
        members: &[&str],
        children: &[Spore],
        depth: usize,
    ) -> Result<Option<Metadata>> {
        if let Some(first) = children.first() {
            if let Some(metadata) = Metadata::from_nested(first)? {
                debug!("detected nested metadata block {}", members[0]);
                return Ok(Some(metadata));
            }
        }

        // The inline header only ever leads a whole frozen string; nested members are data.
        if self.options.legacy_inline_metadata && depth == 0 {
            if let Some(metadata) = Metadata::from_inline(members) {
                debug!("detected legacy inline metadata header labelled {:?}", metadata.label());
                return Ok(Some(metadata));
            }
        }

        Ok(None)
    }
}

/// Serde deserializer over a borrowed [`Spore`] tree.
///
/// Created via [`Deserializer::new`]; most callers want [`crate::from_spore`] or
/// [`crate::from_str`].
#[derive(Clone, Copy, Debug)]
pub struct Deserializer<'de> {
    spore: &'de Spore,
}

impl<'de> Deserializer<'de> {
    pub fn new(spore: &'de Spore) -> Self {
        Deserializer { spore }
    }

    fn not_null(&self, expected: &str) -> Result<()> {
        if self.spore.is_payload_null() {
            Err(Error::unexpected_null(expected))
        } else {
            Ok(())
        }
    }

    fn parse<T: FromStr>(&self, expected: &str) -> Result<T> {
        self.not_null(expected)?;
        match self.spore {
            Spore::Atomic(payload) => payload
                .parse()
                .map_err(|_| Error::invalid_value(expected, payload)),
            Spore::Composite(_) => Err(Error::invalid_value(expected, &self.spore.to_frozen())),
        }
    }

    /// Children of a composite that stands for a positional record.
    fn fields(&self, expected: &str) -> Result<&'de [Spore]> {
        self.not_null(expected)?;
        match self.spore {
            Spore::Composite(composite) => Ok(composite.children()),
            Spore::Atomic(payload) => Err(Error::invalid_value(expected, payload)),
        }
    }

    /// Elements of a collection: the empty sentinel has none, a composite has its children.
    fn elements(&self, expected: &str) -> Result<&'de [Spore]> {
        if self.spore.is_empty_collection() {
            return Ok(&[]);
        }
        self.fields(expected)
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.spore {
            Spore::Atomic(_) if self.spore.is_payload_null() => visitor.visit_none(),
            Spore::Atomic(_) if self.spore.is_empty_collection() => {
                visitor.visit_seq(SeqDeserializer::new(&[]))
            }
            Spore::Atomic(payload) => visitor.visit_borrowed_str(payload),
            Spore::Composite(composite) => {
                visitor.visit_seq(SeqDeserializer::new(composite.children()))
            }
        }
    }

    /// Anything but a case-insensitive `true` thaws to `false`.
    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.not_null("bool")?;
        let value = self
            .spore
            .payload()
            .is_some_and(|payload| payload.eq_ignore_ascii_case("true"));
        visitor.visit_bool(value)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.not_null("string")?;
        match self.spore {
            Spore::Atomic(payload) => visitor.visit_borrowed_str(payload),
            Spore::Composite(_) => visitor.visit_string(self.spore.to_frozen()),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.spore.is_payload_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.spore.is_payload_null() {
            visitor.visit_unit()
        } else {
            Err(Error::invalid_value("null", &self.spore.to_frozen()))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == SPORE_TOKEN {
            let frozen: de::value::StringDeserializer<Error> =
                self.spore.to_frozen().into_deserializer();
            return visitor.visit_newtype_struct(frozen);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.elements("collection")?))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.fields("tuple")?))
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.fields(name)?))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let members = self.elements("map")?;
        if members.len() % 2 != 0 {
            return Err(Error::AmbiguousMapEncoding { len: members.len() });
        }
        visitor.visit_map(MapDeserializer::new(members))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.fields(name)?))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.not_null(name)?;
        let (ordinal, fields) = match self.spore {
            Spore::Atomic(_) => (self, &[][..]),
            Spore::Composite(composite) => match composite.children().split_first() {
                Some((ordinal, fields)) => (Deserializer::new(ordinal), fields),
                None => return Err(Error::invalid_value(name, &self.spore.to_frozen())),
            },
        };
        let ordinal = ordinal.parse::<u32>("variant ordinal")?;
        visitor.visit_enum(EnumDeserializer { ordinal, fields })
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqDeserializer<'de> {
    iter: std::slice::Iter<'de, Spore>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(children: &'de [Spore]) -> Self {
        SeqDeserializer {
            iter: children.iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(child) => seed.deserialize(Deserializer::new(child)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Walks an interleaved `[key, value, key, value, …]` member list.
struct MapDeserializer<'de> {
    iter: std::slice::Iter<'de, Spore>,
}

impl<'de> MapDeserializer<'de> {
    fn new(members: &'de [Spore]) -> Self {
        MapDeserializer {
            iter: members.iter(),
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(key) => seed.deserialize(Deserializer::new(key)).map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len() / 2)
    }
}

struct EnumDeserializer<'de> {
    ordinal: u32,
    fields: &'de [Spore],
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let ordinal: de::value::U32Deserializer<Error> = self.ordinal.into_deserializer();
        let variant = seed.deserialize(ordinal)?;
        Ok((
            variant,
            VariantDeserializer {
                fields: self.fields,
            },
        ))
    }
}

struct VariantDeserializer<'de> {
    fields: &'de [Spore],
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Error::custom("Expected unit variant"))
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.fields {
            [value] => seed.deserialize(Deserializer::new(value)),
            _ => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.fields))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(SeqDeserializer::new(self.fields))
    }
}
