//! Language tags used by the locale primitive.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A normalised BCP 47 style language tag such as `en-US` or `zh-Hant-TW`.
///
/// Parsing accepts `-` or `_` between subtags. The language is lowercased, a four-letter
/// script is title-cased, a region is uppercased, and any further subtags are lowercased.
/// The empty tag is the root locale.
///
/// # Examples
///
/// ```rust
/// use spore::Locale;
///
/// let locale: Locale = "EN_us".parse().unwrap();
/// assert_eq!(locale.to_string(), "en-US");
/// assert_eq!(locale.language(), "en");
/// assert_eq!(locale.region(), Some("US"));
///
/// let locale: Locale = "zh-hant-tw".parse().unwrap();
/// assert_eq!(locale.to_string(), "zh-Hant-TW");
/// assert_eq!(locale.script(), Some("Hant"));
///
/// assert!(Locale::root().is_root());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
    variants: Vec<String>,
}

impl Locale {
    #[must_use]
    pub fn root() -> Self {
        Locale::default()
    }

    /// Builds a locale from a language and an optional region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if either subtag is malformed.
    pub fn new(language: &str, region: Option<&str>) -> Result<Self> {
        match region {
            Some(region) => format!("{language}-{region}").parse(),
            None => language.parse(),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }
}

fn is_alpha(subtag: &str) -> bool {
    subtag.bytes().all(|b| b.is_ascii_alphabetic())
}

fn title_case(subtag: &str) -> String {
    let lower = subtag.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => lower,
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        if tag.is_empty() {
            return Ok(Locale::root());
        }

        let mut subtags = tag.split(['-', '_']);
        let language = subtags.next().unwrap_or_default();
        if !(2..=8).contains(&language.len()) || !is_alpha(language) {
            return Err(Error::invalid_value("language tag", tag));
        }

        let mut locale = Locale {
            language: language.to_ascii_lowercase(),
            ..Locale::default()
        };

        for subtag in subtags {
            if subtag.is_empty() || !subtag.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(Error::invalid_value("language tag", tag));
            }

            let is_region = (subtag.len() == 2 && is_alpha(subtag))
                || (subtag.len() == 3 && subtag.bytes().all(|b| b.is_ascii_digit()));

            if locale.script.is_none()
                && locale.region.is_none()
                && locale.variants.is_empty()
                && subtag.len() == 4
                && is_alpha(subtag)
            {
                locale.script = Some(title_case(subtag));
            } else if locale.region.is_none() && locale.variants.is_empty() && is_region {
                locale.region = Some(subtag.to_ascii_uppercase());
            } else {
                locale.variants.push(subtag.to_ascii_lowercase());
            }
        }

        Ok(locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        for subtag in self
            .script
            .iter()
            .chain(self.region.iter())
            .chain(self.variants.iter())
        {
            write!(f, "-{subtag}")?;
        }
        Ok(())
    }
}
