//! # spore
//!
//! A self-describing, schema-less textual encoding for tree-shaped values.
//!
//! ## What is a spore?
//!
//! A spore is a value, or an ordered collection of values, flattened into one delimited string
//! that can be stored or transmitted and later rebuilt from the string alone. Composite nodes
//! may carry a version and a unique type identifier, which a registry resolves back to the
//! concrete type on the way in.
//!
//! ## Key Features
//!
//! - **Pure Text**: `{|`, `|}` and `_|_` are the only structural tokens
//! - **Three-State Collections**: absent (`--`), empty (`-e-`) and populated stay distinguishable
//! - **Ordered Cursor API**: [`SporeBuilder`] writes children, [`SporeReader`] reads them back in order
//! - **Explicit Registry**: type-directed decode through an ahead-of-time [`SporeRegistry`]
//! - **Serde Compatible**: [`to_string`] and [`from_str`] work with `#[derive(Serialize, Deserialize)]`
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! spore = "0.1"
//! ```
//!
//! ### Writing and reading by hand
//!
//! ```rust
//! use spore::{Spore, SporeBuilder, Thaw};
//!
//! let tags = vec!["red", "blue"];
//! let spore = SporeBuilder::with_version("2")
//!     .append("widget")
//!     .append(&Some(42))
//!     .append_as_collection(Some(&tags), |tag| Spore::atomic(*tag))
//!     .build();
//!
//! let frozen = spore.to_string();
//! assert_eq!(frozen, "{|{|spr_|_v2|}_|_widget_|_42_|_{|red_|_blue|}|}");
//!
//! let thawed = Spore::from_frozen(&frozen).unwrap();
//! let mut reader = thawed.reader();
//! assert_eq!(reader.next_as_string().unwrap().as_deref(), Some("widget"));
//! assert_eq!(reader.next_as_i32().unwrap(), Some(42));
//! let tags = reader.next_as_list(String::thaw).unwrap();
//! assert_eq!(tags, Some(vec!["red".to_string(), "blue".to_string()]));
//! ```
//!
//! ### Through serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use spore::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     nickname: Option<String>,
//! }
//!
//! let user = User { id: 7, name: "Ada".to_string(), nickname: None };
//!
//! let frozen = to_string(&user).unwrap();
//! assert_eq!(frozen, "{|7_|_Ada_|_--|}");
//!
//! let back: User = from_str(&frozen).unwrap();
//! assert_eq!(back, user);
//! ```
//!
//! ### Literal trees with the spore! macro
//!
//! ```rust
//! use spore::spore;
//!
//! let tree = spore!({ id: "Pair" } [1, [null, empty]]);
//! assert_eq!(tree.to_string(), "{|{|spr_|_uPair|}_|_1_|_{|--_|_-e-|}|}");
//! ```
//!
//! ## Thread Safety
//!
//! Built and decoded [`Spore`] trees are immutable and `Send + Sync`. A [`SporeBuilder`] or
//! [`SporeReader`] is a single-owner cursor and is not internally synchronized.
//!
//! ## Format
//!
//! See the [`format`] module for the grammar, the metadata layouts and the tokenizer's limits.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Building, freezing and reading a spore
//! - **`registry.rs`** - Type-directed decode through a registry
//!
//! Run any example with: `cargo run --example <name>`

pub mod builder;
pub mod de;
pub mod error;
pub mod format;
pub mod freeze;
pub mod locale;
pub mod macros;
pub mod metadata;
pub mod options;
pub mod reader;
pub mod registry;
pub mod ser;
pub mod spore;
pub mod tokenizer;

pub use builder::SporeBuilder;
pub use de::{Decoder, Deserializer};
pub use error::{Error, Result};
pub use freeze::{Freeze, Ordinal, Sporable, SporeType, Thaw};
pub use locale::Locale;
pub use metadata::{Metadata, MetadataEntry, MetadataKind, MetadataLayout};
pub use options::{SporeOptions, DEFAULT_MAX_DEPTH};
pub use reader::{Elements, SporeReader, Thawed};
pub use registry::{Registration, Resolution, ResolveHints, SporeRegistry, TypeResolver};
pub use ser::{Encoder, SporeSerializer};
pub use spore::{
    Composite, Spore, EMPTY_COLLECTION_PAYLOAD, MEMBER_SEPARATOR, NULL_PAYLOAD, SPORE_PREFIX,
    SPORE_SUFFIX,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Freezes any [`Freeze`] value into a spore.
///
/// # Examples
///
/// ```rust
/// use spore::{freeze, Spore};
///
/// assert_eq!(freeze(&12u8), Spore::atomic("12"));
/// assert_eq!(freeze(&None::<i32>), Spore::null());
/// ```
#[must_use]
pub fn freeze<T>(value: &T) -> Spore
where
    T: ?Sized + Freeze,
{
    value.freeze()
}

/// Convert any `T: Serialize` to a [`Spore`] tree.
///
/// # Examples
///
/// ```rust
/// use spore::to_spore;
///
/// let spore = to_spore(&vec![1, 2]).unwrap();
/// assert_eq!(spore.children().len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` impl reports one.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_spore<T>(value: &T) -> Result<Spore>
where
    T: ?Sized + Serialize,
{
    ser::to_spore_value(value)
}

/// Serialize any `T: Serialize` to a frozen spore string.
///
/// # Examples
///
/// ```rust
/// use spore::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "{|1_|_2|}");
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` impl reports one.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(to_spore(value)?.to_frozen())
}

/// Deserialize an instance of type `T` from a borrowed spore tree.
///
/// # Examples
///
/// ```rust
/// use ::spore::{from_spore, spore};
///
/// let tree = spore!([3, 4]);
/// let pair: (u8, u8) = from_spore(&tree).unwrap();
/// assert_eq!(pair, (3, 4));
/// ```
///
/// # Errors
///
/// Returns an error if the tree does not have the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_spore<'de, T>(spore: &'de Spore) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(Deserializer::new(spore))
}

/// Deserialize an instance of type `T` from a frozen spore string.
///
/// The serializer never writes the legacy inline metadata header, so it is not recognised here;
/// a top-level sequence such as `["v2", "u", "abc"]` thaws intact.
///
/// # Examples
///
/// ```rust
/// use spore::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{|1_|_2|}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, SporeOptions::new().with_legacy_inline_metadata(false))
}

/// Like [`from_str`], decoding with custom options.
///
/// # Errors
///
/// Returns an error if the input is malformed or cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(s: &str, options: SporeOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    let spore = Spore::from_frozen_with_options(s, options)?;
    from_spore(&spore)
}
