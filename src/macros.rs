/// Builds a [`Spore`](crate::Spore) tree from a literal description.
///
/// - `spore!(null)` is the null sentinel, `spore!(empty)` the empty-collection sentinel.
/// - `spore!([a, b, [c]])` is a composite; nested brackets nest composites.
/// - `spore!({ version: "1", id: "Order" } [a, b])` is a composite with metadata.
/// - Any other expression is frozen through [`Freeze`](crate::Freeze).
///
/// # Examples
///
/// ```rust
/// use spore::spore;
///
/// let tree = spore!({ version: "3", id: "Filter" } ["recent", 10, null, [empty, "x"]]);
/// assert_eq!(
///     tree.to_string(),
///     "{|{|spr_|_v3_|_uFilter|}_|_recent_|_10_|_--_|_{|-e-_|_x|}|}"
/// );
/// ```
#[macro_export]
macro_rules! spore {
    (@metadata $builder:ident, version, $value:expr) => {
        $builder.version($value);
    };

    (@metadata $builder:ident, id, $value:expr) => {
        $builder.unique_identifier($value);
    };

    (null) => {
        $crate::Spore::null()
    };

    (empty) => {
        $crate::Spore::empty_collection()
    };

    ([]) => {
        $crate::Spore::composite(vec![])
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Spore::composite(vec![$($crate::spore!($elem)),+])
    };

    ({ $($key:ident : $value:expr),* $(,)? } [ $($elem:tt),* $(,)? ]) => {{
        let mut builder = $crate::SporeBuilder::new();
        $( $crate::spore!(@metadata builder, $key, $value); )*
        $( builder.append_spore($crate::spore!($elem)); )*
        builder.build()
    }};

    ($value:expr) => {
        $crate::freeze(&$value)
    };
}

/// Implements [`Ordinal`](crate::Ordinal) for a fieldless enum by declaration order.
///
/// Every variant must be listed, in declaration order. The enum also gets
/// [`Freeze`](crate::Freeze) and [`Thaw`](crate::Thaw) impls that store it as its ordinal, so it
/// works with `append`, `next_as` and collection reads like any primitive.
///
/// # Examples
///
/// ```rust
/// use spore::{impl_ordinal, Freeze, Ordinal, Spore, Thaw};
///
/// #[derive(Debug, PartialEq)]
/// enum Status { Draft, Active, Archived }
///
/// impl_ordinal!(Status { Draft, Active, Archived });
///
/// assert_eq!(Status::Archived.ordinal(), 2);
/// assert_eq!(Status::from_ordinal(1), Some(Status::Active));
/// assert_eq!(Status::from_ordinal(3), None);
///
/// assert_eq!(Status::Active.freeze(), Spore::atomic("1"));
/// assert_eq!(Status::thaw(&Spore::atomic("2")).unwrap(), Status::Archived);
/// assert!(Status::thaw(&Spore::atomic("3")).is_err());
/// ```
#[macro_export]
macro_rules! impl_ordinal {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::Ordinal for $ty {
            fn ordinal(&self) -> usize {
                enum Position { $($variant),+ }
                match self {
                    $( $ty::$variant => Position::$variant as usize, )+
                }
            }

            fn from_ordinal(ordinal: usize) -> Option<Self> {
                enum Position { $($variant),+ }
                $(
                    if ordinal == Position::$variant as usize {
                        return Some($ty::$variant);
                    }
                )+
                None
            }
        }

        impl $crate::Freeze for $ty {
            fn freeze(&self) -> $crate::Spore {
                $crate::Spore::atomic($crate::Ordinal::ordinal(self).to_string())
            }
        }

        impl $crate::Thaw for $ty {
            fn thaw(spore: &$crate::Spore) -> $crate::Result<Self> {
                let ordinal = <usize as $crate::Thaw>::thaw(spore)?;
                <Self as $crate::Ordinal>::from_ordinal(ordinal).ok_or($crate::Error::InvalidOrdinal {
                    ordinal,
                    type_name: ::std::any::type_name::<Self>(),
                })
            }
        }
    };
}
