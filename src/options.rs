//! Configuration options for decoding frozen spores.
//!
//! Encoding has no options: every tree has exactly one canonical frozen form. Decoding can be
//! tuned with [`SporeOptions`]:
//!
//! - `max_depth`: how deeply composites may nest before the decoder gives up
//! - `legacy_inline_metadata`: whether the old inline `v…_|_u_|_<label>` header is recognised
//!
//! ## Examples
//!
//! ```rust
//! use spore::{Spore, SporeOptions, Error};
//!
//! let options = SporeOptions::new().with_max_depth(Some(1));
//!
//! assert!(Spore::from_frozen_with_options("{|a_|_b|}", options.clone()).is_ok());
//! assert_eq!(
//!     Spore::from_frozen_with_options("{|{|a|}|}", options),
//!     Err(Error::DepthLimitExceeded { limit: 1 })
//! );
//! ```

/// Default nesting limit applied by [`SporeOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration options for the spore decoder.
///
/// # Examples
///
/// ```rust
/// use spore::SporeOptions;
///
/// let options = SporeOptions::new();
/// assert_eq!(options.max_depth, Some(128));
/// assert!(options.legacy_inline_metadata);
///
/// let strict = SporeOptions::new()
///     .with_max_depth(Some(16))
///     .with_legacy_inline_metadata(false);
/// assert_eq!(strict.max_depth, Some(16));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SporeOptions {
    /// Maximum composite nesting accepted; `None` disables the check.
    pub max_depth: Option<usize>,
    pub legacy_inline_metadata: bool,
}

impl Default for SporeOptions {
    fn default() -> Self {
        SporeOptions {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            legacy_inline_metadata: true,
        }
    }
}

impl SporeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum composite nesting depth.
    ///
    /// A bare atomic has depth zero and each enclosing composite adds one level.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables recognition of the legacy inline metadata header.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spore::{Spore, SporeOptions};
    ///
    /// let frozen = "{|v1_|_u_|_Label_|_x|}";
    /// let legacy = Spore::from_frozen(frozen).unwrap();
    /// assert_eq!(legacy.children().len(), 1);
    ///
    /// let options = SporeOptions::new().with_legacy_inline_metadata(false);
    /// let plain = Spore::from_frozen_with_options(frozen, options).unwrap();
    /// assert_eq!(plain.children().len(), 4);
    /// assert!(plain.metadata().is_none());
    /// ```
    #[must_use]
    pub fn with_legacy_inline_metadata(mut self, enabled: bool) -> Self {
        self.legacy_inline_metadata = enabled;
        self
    }
}
