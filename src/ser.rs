//! Spore serialization.
//!
//! This module holds both directions of the encode path:
//!
//! - [`Encoder`] renders a [`Spore`] tree into its canonical frozen string.
//! - [`SporeSerializer`] is a serde `Serializer` that freezes any `T: Serialize` into a tree.
//!
//! ## Canonical form
//!
//! An atomic renders as its payload verbatim. A composite renders as `{|`, then its metadata
//! block (if any) and its children joined by `_|_`, then `|}`. Nothing is escaped.
//!
//! ## Serde data model mapping
//!
//! | serde | spore |
//! |---|---|
//! | `None`, unit, unit struct | null sentinel `--` |
//! | bool, numbers, char, str | atomic display string |
//! | seq, set, bytes | composite of elements, `-e-` when empty |
//! | map | composite of interleaved keys and values, `-e-` when empty |
//! | tuple, struct | composite of positional fields (names are not written) |
//! | unit variant | atomic ordinal |
//! | newtype, tuple, struct variant | composite `[ordinal, fields…]` |
//!
//! ## Usage
//!
//! ```rust
//! use serde::Serialize;
//! use spore::{to_spore, to_string};
//!
//! #[derive(Serialize)]
//! struct Filter { name: String, tags: Vec<String>, limit: Option<u32> }
//!
//! let filter = Filter { name: "recent".into(), tags: vec![], limit: None };
//! assert_eq!(to_string(&filter).unwrap(), "{|recent_|_-e-_|_--|}");
//!
//! let spore = to_spore(&vec![1, 2, 3]).unwrap();
//! assert_eq!(spore.to_string(), "{|1_|_2_|_3|}");
//! ```

use crate::metadata::{Metadata, MetadataKind, MetadataLayout};
use crate::spore::{Composite, Spore, MEMBER_SEPARATOR, SPORE_PREFIX, SPORE_SUFFIX, SPORE_TOKEN};
use crate::{Error, Result};
use serde::{ser, Serialize};

/// Renders spore trees into canonical frozen strings.
///
/// # Examples
///
/// ```rust
/// use spore::{Encoder, Spore};
///
/// let mut encoder = Encoder::new();
/// encoder.encode(&Spore::composite(vec![Spore::atomic("a"), Spore::null()]));
/// assert_eq!(encoder.into_inner(), "{|a_|_--|}");
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    output: String,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder {
            output: String::with_capacity(128),
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    pub fn encode(&mut self, spore: &Spore) {
        match spore {
            Spore::Atomic(payload) => self.output.push_str(payload),
            Spore::Composite(composite) => self.encode_composite(composite),
        }
    }

    fn encode_composite(&mut self, composite: &Composite) {
        self.output.push_str(SPORE_PREFIX);
        let mut first = true;

        if let Some(metadata) = composite.metadata() {
            self.encode_metadata(metadata, &mut first);
        }
        for child in composite.children() {
            self.write_separator(&mut first);
            self.encode(child);
        }

        self.output.push_str(SPORE_SUFFIX);
    }

    fn encode_metadata(&mut self, metadata: &Metadata, first: &mut bool) {
        match metadata.layout() {
            MetadataLayout::Nested => {
                self.write_separator(first);
                self.output.push_str(SPORE_PREFIX);
                self.output.push_str(MetadataKind::Prefix.prefix());
                for entry in metadata.entries() {
                    self.output.push_str(MEMBER_SEPARATOR);
                    self.output.push_str(entry.kind().prefix());
                    self.output.push_str(entry.info());
                }
                self.output.push_str(SPORE_SUFFIX);
            }
            MetadataLayout::Inline { label } => {
                for entry in metadata.entries() {
                    self.write_separator(first);
                    self.output.push_str(entry.kind().prefix());
                    self.output.push_str(entry.info());
                }
                self.write_separator(first);
                self.output.push_str(label);
            }
        }
    }

    #[inline]
    fn write_separator(&mut self, first: &mut bool) {
        if *first {
            *first = false;
        } else {
            self.output.push_str(MEMBER_SEPARATOR);
        }
    }
}

/// Serde serializer that freezes a value into a [`Spore`] tree.
///
/// Most callers want [`crate::to_spore`] or [`crate::to_string`] instead.
pub struct SporeSerializer;

/// Accumulates positional members: sequences, tuples, structs and their variant forms.
pub struct SerializeVec {
    children: Vec<Spore>,
    /// Collections collapse to the empty-collection sentinel when nothing was added.
    collection: bool,
}

/// Accumulates interleaved map keys and values.
pub struct SerializeMap {
    children: Vec<Spore>,
}

impl SerializeVec {
    fn collection() -> Self {
        SerializeVec {
            children: Vec::new(),
            collection: true,
        }
    }

    fn positional(capacity: usize) -> Self {
        SerializeVec {
            children: Vec::with_capacity(capacity),
            collection: false,
        }
    }

    fn variant(variant_index: u32, len: usize) -> Self {
        let mut children = Vec::with_capacity(len + 1);
        children.push(Spore::Atomic(variant_index.to_string()));
        SerializeVec {
            children,
            collection: false,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.children.push(to_spore_value(value)?);
        Ok(())
    }

    fn finish(self) -> Spore {
        if self.collection && self.children.is_empty() {
            Spore::empty_collection()
        } else {
            Spore::composite(self.children)
        }
    }
}

impl ser::Serializer for SporeSerializer {
    type Ok = Spore;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeVec;
    type SerializeStructVariant = SerializeVec;

    fn serialize_bool(self, v: bool) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_i16(self, v: i16) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_i32(self, v: i32) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_i64(self, v: i64) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_u16(self, v: u16) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_u32(self, v: u32) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_u64(self, v: u64) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Spore> {
        Ok(Spore::Atomic(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Spore> {
        let mut seq = SerializeVec::collection();
        for byte in v {
            seq.push(byte)?;
        }
        Ok(seq.finish())
    }

    fn serialize_none(self) -> Result<Spore> {
        Ok(Spore::null())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Spore>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Spore> {
        Ok(Spore::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Spore> {
        Ok(Spore::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<Spore> {
        Ok(Spore::Atomic(variant_index.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Spore>
    where
        T: ?Sized + Serialize,
    {
        let spore = value.serialize(self)?;
        if name == SPORE_TOKEN {
            // A Spore travels as its frozen string; rebuild the tree from it.
            if let Spore::Atomic(frozen) = &spore {
                return Spore::from_embedded(frozen);
            }
        }
        Ok(spore)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Spore>
    where
        T: ?Sized + Serialize,
    {
        let mut fields = SerializeVec::variant(variant_index, 1);
        fields.push(value)?;
        Ok(fields.finish())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::collection())
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::positional(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::positional(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::variant(variant_index, len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            children: Vec::with_capacity(len.unwrap_or(0) * 2),
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::positional(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::variant(variant_index, len))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeVec {
    type Ok = Spore;
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Spore> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Spore;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.children.push(to_spore_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.children.len() % 2 == 0 {
            return Err(Error::custom("serialize_value called without serialize_key"));
        }
        self.children.push(to_spore_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Spore> {
        if self.children.is_empty() {
            Ok(Spore::empty_collection())
        } else {
            Ok(Spore::composite(self.children))
        }
    }
}

pub(crate) fn to_spore_value<T: Serialize + ?Sized>(value: &T) -> Result<Spore> {
    value.serialize(SporeSerializer)
}
