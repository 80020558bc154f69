//! Capability traits for turning domain values into spores and back.
//!
//! - [`Freeze`]: a value renders itself as one [`Spore`].
//! - [`Thaw`]: a value is rebuilt from one non-optional [`Spore`].
//! - [`Sporable`]: a domain type assembles its own composite and repopulates itself from one.
//! - [`SporeType`]: the version and unique identifier a sporable type declares.
//! - [`Ordinal`]: an enum stored by its zero-based declaration position.
//!
//! Every [`Sporable`] type freezes through [`Sporable::assemble_spore`]. Primitives freeze to
//! their display string.
//!
//! ## Examples
//!
//! ```rust
//! use spore::{Freeze, Result, Spore, SporeBuilder, Sporable, SporeType, Thaw};
//!
//! #[derive(Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl SporeType for Point {
//!     const UNIQUE_IDENTIFIER: &'static str = "Point";
//!     const VERSION: Option<&'static str> = Some("1");
//! }
//!
//! impl Sporable for Point {
//!     fn assemble_spore(&self) -> Spore {
//!         SporeBuilder::for_type::<Self>().append(&self.x).append(&self.y).build()
//!     }
//!
//!     fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
//!         let mut reader = spore.reader();
//!         self.x = reader.next_as_i32()?.unwrap_or_default();
//!         self.y = reader.next_as_i32()?.unwrap_or_default();
//!         Ok(())
//!     }
//! }
//!
//! let frozen = Point { x: 3, y: -1 }.freeze().to_string();
//! assert_eq!(frozen, "{|{|spr_|_v1_|_uPoint|}_|_3_|_-1|}");
//!
//! assert_eq!(i32::thaw(&Spore::atomic("7")).unwrap(), 7);
//! ```

use crate::locale::Locale;
use crate::spore::Spore;
use crate::{Error, Result};
use chrono::NaiveDate;
use uuid::Uuid;

/// Renders a value as a single spore.
pub trait Freeze {
    fn freeze(&self) -> Spore;
}

/// Rebuilds a value from a single spore.
///
/// Implementations for non-optional types reject the null sentinel with
/// [`Error::UnexpectedNull`]; `Option<T>` maps it to `None`.
pub trait Thaw: Sized {
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedNull`] or [`Error::InvalidValue`] when the spore does not hold
    /// a value of this type.
    fn thaw(spore: &Spore) -> Result<Self>;
}

/// A domain type that can assemble its own spore and repopulate itself from one.
///
/// `populate_from_spore` receives the raw spore, which may be the null sentinel when the
/// caller passes it through unchecked.
pub trait Sporable {
    fn assemble_spore(&self) -> Spore;

    /// Reads this instance's state back from a spore produced by [`Sporable::assemble_spore`].
    ///
    /// # Errors
    ///
    /// Returns whatever decode error the underlying reads produce.
    fn populate_from_spore(&mut self, spore: &Spore) -> Result<()>;
}

/// Type-level declaration of the metadata a sporable type writes.
///
/// The unique identifier is what registries resolve on; the version is optional.
pub trait SporeType: Sporable {
    const UNIQUE_IDENTIFIER: &'static str;
    const VERSION: Option<&'static str> = None;
}

/// An enum frozen by its zero-based declaration position.
///
/// Positions are load-bearing for stored data: reordering or inserting variants changes the
/// meaning of existing frozen strings. Usually implemented with [`crate::impl_ordinal!`].
pub trait Ordinal: Sized {
    fn ordinal(&self) -> usize;

    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

impl<T: Sporable + ?Sized> Freeze for T {
    fn freeze(&self) -> Spore {
        self.assemble_spore()
    }
}

impl<T: Freeze> Freeze for Option<T> {
    fn freeze(&self) -> Spore {
        match self {
            Some(value) => value.freeze(),
            None => Spore::null(),
        }
    }
}

impl<T: Thaw> Thaw for Option<T> {
    fn thaw(spore: &Spore) -> Result<Self> {
        if spore.is_payload_null() {
            Ok(None)
        } else {
            T::thaw(spore).map(Some)
        }
    }
}

impl Freeze for Spore {
    fn freeze(&self) -> Spore {
        self.clone()
    }
}

impl Thaw for Spore {
    fn thaw(spore: &Spore) -> Result<Self> {
        Ok(spore.clone())
    }
}

impl Freeze for str {
    fn freeze(&self) -> Spore {
        Spore::atomic(self)
    }
}

impl Freeze for &str {
    fn freeze(&self) -> Spore {
        Spore::atomic(*self)
    }
}

impl Freeze for String {
    fn freeze(&self) -> Spore {
        Spore::atomic(self.as_str())
    }
}

/// A composite thaws to its own frozen text.
impl Thaw for String {
    fn thaw(spore: &Spore) -> Result<Self> {
        match spore {
            Spore::Atomic(_) if spore.is_payload_null() => Err(Error::unexpected_null("string")),
            Spore::Atomic(payload) => Ok(payload.clone()),
            Spore::Composite(_) => Ok(spore.to_frozen()),
        }
    }
}

impl Freeze for bool {
    fn freeze(&self) -> Spore {
        Spore::Atomic(self.to_string())
    }
}

/// Anything but a case-insensitive `true` thaws to `false`.
impl Thaw for bool {
    fn thaw(spore: &Spore) -> Result<Self> {
        let text = atomic_text(spore, "bool")?;
        Ok(text.eq_ignore_ascii_case("true"))
    }
}

/// Returns the text of a non-null spore; composites yield their frozen form.
fn atomic_text(spore: &Spore, expected: &str) -> Result<String> {
    if spore.is_payload_null() {
        return Err(Error::unexpected_null(expected));
    }
    Ok(match spore {
        Spore::Atomic(payload) => payload.clone(),
        Spore::Composite(_) => spore.to_frozen(),
    })
}

pub(crate) fn parse_text<T: std::str::FromStr>(text: &str, expected: &str) -> Result<T> {
    text.parse().map_err(|_| Error::invalid_value(expected, text))
}

macro_rules! impl_display_freeze_thaw {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Freeze for $ty {
                fn freeze(&self) -> Spore {
                    Spore::Atomic(self.to_string())
                }
            }

            impl Thaw for $ty {
                fn thaw(spore: &Spore) -> Result<Self> {
                    let text = atomic_text(spore, stringify!($ty))?;
                    parse_text(&text, stringify!($ty))
                }
            }
        )*
    };
}

impl_display_freeze_thaw!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, Uuid,
    Locale,
);

/// Dates freeze as ISO-8601 calendar dates (`2024-03-09`).
impl Freeze for NaiveDate {
    fn freeze(&self) -> Spore {
        Spore::Atomic(self.format("%Y-%m-%d").to_string())
    }
}

impl Thaw for NaiveDate {
    fn thaw(spore: &Spore) -> Result<Self> {
        let text = atomic_text(spore, "date")?;
        NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| Error::invalid_value("date", &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_freeze() {
        assert_eq!(42i32.freeze(), Spore::atomic("42"));
        assert_eq!(true.freeze(), Spore::atomic("true"));
        assert_eq!("x".freeze(), Spore::atomic("x"));
        assert_eq!(Option::<i32>::None.freeze(), Spore::null());
        assert_eq!(Some(1.5f64).freeze(), Spore::atomic("1.5"));
    }

    #[test]
    fn test_refreezing_atomic_is_identity() {
        let spore = Spore::atomic("plain");
        assert_eq!(spore.freeze(), spore);
        assert_eq!(Spore::null().freeze(), Spore::null());
    }

    #[test]
    fn test_thaw_rejects_null_for_required() {
        assert_eq!(
            i64::thaw(&Spore::null()),
            Err(Error::unexpected_null("i64"))
        );
        assert_eq!(Option::<i64>::thaw(&Spore::null()), Ok(None));
    }

    #[test]
    fn test_thaw_invalid_number() {
        assert_eq!(
            i32::thaw(&Spore::atomic("abc")),
            Err(Error::invalid_value("i32", "abc"))
        );
    }

    #[test]
    fn test_uuid_and_date() {
        let id = Uuid::new_v4();
        assert_eq!(Uuid::thaw(&id.freeze()).unwrap(), id);

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(date.freeze(), Spore::atomic("2024-03-09"));
        assert_eq!(NaiveDate::thaw(&Spore::atomic("2024-03-09")).unwrap(), date);
        assert!(NaiveDate::thaw(&Spore::atomic("09/03/2024")).is_err());
    }

    #[test]
    fn test_string_thaw_of_composite() {
        let spore = Spore::composite(vec![Spore::atomic("a"), Spore::atomic("b")]);
        assert_eq!(String::thaw(&spore).unwrap(), "{|a_|_b|}");
    }
}
