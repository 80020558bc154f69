//! Type resolution for automatic instantiation.
//!
//! A frozen composite can carry a unique type identifier in its metadata. Turning such a
//! spore back into a domain value needs something that maps the identifier to a concrete
//! type: the [`TypeResolver`] capability. [`SporeRegistry`] is the provided implementation,
//! an explicit table populated once at startup and read-only afterwards, so lookups need no
//! locking.
//!
//! ## Examples
//!
//! ```rust
//! use spore::{Freeze, Result, Spore, SporeBuilder, SporeRegistry, Sporable, SporeType};
//!
//! #[derive(Default)]
//! struct Invoice { number: i64 }
//!
//! impl SporeType for Invoice {
//!     const UNIQUE_IDENTIFIER: &'static str = "Invoice";
//! }
//!
//! impl Sporable for Invoice {
//!     fn assemble_spore(&self) -> Spore {
//!         SporeBuilder::for_type::<Self>().append(&self.number).build()
//!     }
//!
//!     fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
//!         self.number = spore.reader().next_as_i64()?.unwrap_or_default();
//!         Ok(())
//!     }
//! }
//!
//! let mut registry: SporeRegistry = SporeRegistry::new();
//! registry.register_type::<Invoice>();
//!
//! let spore: Spore = Invoice { number: 17 }.freeze().to_string().parse().unwrap();
//! let instance = spore.to_instance(&registry).unwrap();
//! assert_eq!(instance.assemble_spore(), spore);
//! ```

use crate::freeze::{Sporable, SporeType};
use crate::spore::Spore;
use crate::{Error, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use std::fmt;

type Factory<T> = Box<dyn Fn() -> Result<Box<T>> + Send + Sync>;

/// Optional filters narrowing a lookup when several types share an identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveHints {
    /// Keeps types whose full path starts with this module-path prefix.
    pub type_hint: Option<String>,
    /// Keeps types whose simple name equals this.
    pub name_hint: Option<String>,
}

impl ResolveHints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type_hint(mut self, type_hint: &str) -> Self {
        self.type_hint = Some(type_hint.to_string());
        self
    }

    #[must_use]
    pub fn with_name_hint(mut self, name_hint: &str) -> Self {
        self.name_hint = Some(name_hint.to_string());
        self
    }

    fn accepts<T: ?Sized>(&self, registration: &Registration<T>) -> bool {
        let type_matches = self
            .type_hint
            .as_deref()
            .map_or(true, |hint| registration.type_path.starts_with(hint));
        let name_matches = self
            .name_hint
            .as_deref()
            .map_or(true, |hint| registration.simple_name() == hint);
        type_matches && name_matches
    }
}

/// One type registered under a unique identifier.
pub struct Registration<T: ?Sized> {
    unique_identifier: String,
    type_path: String,
    factory: Factory<T>,
}

impl<T: ?Sized> Registration<T> {
    pub fn new<F>(unique_identifier: &str, type_path: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Box<T>> + Send + Sync + 'static,
    {
        Registration {
            unique_identifier: unique_identifier.to_string(),
            type_path: type_path.to_string(),
            factory: Box::new(factory),
        }
    }

    #[must_use]
    pub fn unique_identifier(&self) -> &str {
        &self.unique_identifier
    }

    /// Full path of the registered type, as `std::any::type_name` reports it.
    #[must_use]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    /// Last path segment of the type path, generics excluded.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let path = self
            .type_path
            .split_once('<')
            .map_or(self.type_path.as_str(), |(path, _)| path);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Creates a fresh, unpopulated instance.
    ///
    /// # Errors
    ///
    /// Returns whatever the factory reports, usually [`Error::InstantiationFailed`].
    pub fn instantiate(&self) -> Result<Box<T>> {
        (self.factory)()
    }
}

impl<T: ?Sized> fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("unique_identifier", &self.unique_identifier)
            .field("type_path", &self.type_path)
            .finish_non_exhaustive()
    }
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum Resolution<'a, T: ?Sized> {
    Found(&'a Registration<T>),
    NotFound,
    /// Type paths of every candidate that matched.
    Ambiguous(Vec<&'a str>),
}

/// Maps a unique type identifier to the type that can repopulate itself from a spore.
pub trait TypeResolver<T: ?Sized> {
    fn resolve(&self, unique_identifier: &str, hints: &ResolveHints) -> Resolution<'_, T>;
}

/// Registry of sporable types keyed by unique identifier, in registration order.
///
/// `T` is the trait object instances come out as; it defaults to `dyn Sporable`. A registry
/// is `Send + Sync`, so one populated at startup can be shared freely.
pub struct SporeRegistry<T: ?Sized + Sporable = dyn Sporable> {
    registrations: IndexMap<String, Vec<Registration<T>>>,
}

impl<T: ?Sized + Sporable> Default for SporeRegistry<T> {
    fn default() -> Self {
        SporeRegistry {
            registrations: IndexMap::new(),
        }
    }
}

impl<T: ?Sized + Sporable> fmt::Debug for SporeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registrations.values().flatten())
            .finish()
    }
}

impl<T: ?Sized + Sporable> SporeRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `type_path` under `unique_identifier`.
    ///
    /// Registering the same identifier and type path again replaces the earlier factory.
    pub fn register<F>(&mut self, unique_identifier: &str, type_path: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<T>> + Send + Sync + 'static,
    {
        let registration = Registration::new(unique_identifier, type_path, factory);
        let entries = self
            .registrations
            .entry(unique_identifier.to_string())
            .or_default();

        if let Some(existing) = entries.iter_mut().find(|r| r.type_path == type_path) {
            warn!("replacing registration of {type_path} for identifier {unique_identifier:?}");
            *existing = registration;
        } else {
            debug!("registered {type_path} for identifier {unique_identifier:?}");
            entries.push(registration);
        }
        self
    }

    /// Registers `C` under its declared identifier with an infallible factory.
    pub fn register_with<C, F>(&mut self, factory: F) -> &mut Self
    where
        C: SporeType + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register(
            C::UNIQUE_IDENTIFIER,
            std::any::type_name::<C>(),
            move || Ok(factory()),
        )
    }

    /// Number of registrations across all identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn registrations(&self) -> impl Iterator<Item = &Registration<T>> {
        self.registrations.values().flatten()
    }
}

impl SporeRegistry<dyn Sporable> {
    /// Registers `C` under its declared identifier, instantiated through `Default`.
    pub fn register_type<C>(&mut self) -> &mut Self
    where
        C: SporeType + Default + 'static,
    {
        self.register_with::<C, _>(|| Box::new(C::default()) as Box<dyn Sporable>)
    }
}

impl<T: ?Sized + Sporable> TypeResolver<T> for SporeRegistry<T> {
    fn resolve(&self, unique_identifier: &str, hints: &ResolveHints) -> Resolution<'_, T> {
        let candidates: Vec<&Registration<T>> = self
            .registrations
            .get(unique_identifier)
            .map(|entries| entries.iter().filter(|r| hints.accepts(*r)).collect())
            .unwrap_or_default();

        debug!(
            "resolved {unique_identifier:?}: {} candidate(s)",
            candidates.len()
        );
        match candidates.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Found(candidates[0]),
            _ => Resolution::Ambiguous(
                candidates
                    .into_iter()
                    .map(Registration::type_path)
                    .collect(),
            ),
        }
    }
}

impl Spore {
    /// Identifier used for automatic instantiation.
    ///
    /// Falls back to the legacy inline label when the unique identifier is empty.
    fn type_identifier(&self) -> Result<&str> {
        let metadata = self.metadata().ok_or(Error::MissingMetadata)?;
        let unique_identifier = metadata
            .unique_identifier()
            .map_err(|_| Error::MissingMetadata)?;

        match (unique_identifier, metadata.label()) {
            ("", Some(label)) => Ok(label),
            ("", None) => Err(Error::MissingMetadata),
            (unique_identifier, _) => Ok(unique_identifier),
        }
    }

    /// Resolves and creates an instance of this spore's type, then populates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMetadata`], [`Error::TypeResolutionFailed`],
    /// [`Error::TypeResolutionAmbiguous`], the factory's error or the populate error.
    pub fn to_instance<T, R>(&self, resolver: &R) -> Result<Box<T>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        self.to_instance_with_hints(resolver, &ResolveHints::default())
    }

    pub fn to_instance_with_hints<T, R>(&self, resolver: &R, hints: &ResolveHints) -> Result<Box<T>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        let mut instance = self.instantiate_without_populating_with_hints(resolver, hints)?;
        instance.populate_from_spore(self)?;
        Ok(instance)
    }

    /// Resolves and creates an instance of this spore's type without populating it.
    pub fn instantiate_without_populating<T, R>(&self, resolver: &R) -> Result<Box<T>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        self.instantiate_without_populating_with_hints(resolver, &ResolveHints::default())
    }

    pub fn instantiate_without_populating_with_hints<T, R>(
        &self,
        resolver: &R,
        hints: &ResolveHints,
    ) -> Result<Box<T>>
    where
        T: Sporable + ?Sized,
        R: TypeResolver<T> + ?Sized,
    {
        let unique_identifier = self.type_identifier()?;
        match resolver.resolve(unique_identifier, hints) {
            Resolution::Found(registration) => registration.instantiate(),
            Resolution::NotFound => Err(Error::TypeResolutionFailed {
                unique_identifier: unique_identifier.to_string(),
            }),
            Resolution::Ambiguous(candidates) => Err(Error::TypeResolutionAmbiguous {
                unique_identifier: unique_identifier.to_string(),
                candidates: candidates.into_iter().map(str::to_string).collect(),
            }),
        }
    }
}
