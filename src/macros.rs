/// Define an enumeration with known variants and an unknown representation.
///
/// Most network protocols define fields where not all bit-patterns are
/// standardized values. Some of the rest are invalid while others are merely
/// unassigned or administered by a registrar such as IANA. This macro makes
/// it more ergonomic to represent such fields by deriving the converters to
/// and from the underlying integer type.
///
/// # Example
///
/// ```
/// # use ipgate::enum_with_unknown;
/// # fn main() { }
/// enum_with_unknown! {
///     #[derive(Hash)]
///     pub enum Unit(u8) {
///         Meter = 1,
///         Second = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident($ty:ty) {
            $(
              $( #[$variant_attr:meta] )*
              $variant:ident = $value:expr
            ),+ $(,)*
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
        $( #[$enum_attr] )*
        pub enum $name {
            $(
              $( #[$variant_attr] )*
              $variant
            ),*,
            /// A value whose interpretation was not determined.
            ///
            /// Typically a parsed value from an untrusted or more recent
            /// source, but this variant can also be used to emit values that
            /// the library itself does not assign a meaning.
            Unknown($ty)
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                match value {
                    $( $value => $name::$variant ),*,
                    other => $name::Unknown(other)
                }
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value ),*,
                    $name::Unknown(other) => other
                }
            }
        }
    }
}

/// Declare a dynamically sized byte wrapper.
///
/// Use this to create byte slices with inner invariants. This macro performs
/// two basic actions:
/// * Define a type with the indicated structure, documentation, attributes.
///   The type can not have any generic arguments and can only wrap a simple
///   byte slice.
/// * Define two new private methods for conversion from a byte slice:
///   - `fn __from_macro_new_unchecked(&[u8]) -> &Self`
///   - `fn __from_macro_new_unchecked_mut(&mut [u8]) -> &mut Self`
///
/// ## Usage
///
/// You can currently only use a tuple type with a single member, a `[u8]`.
///
/// ```
/// # use ipgate::byte_wrapper;
/// byte_wrapper! {
///     /// A tiny fixed-layout packet.
///     pub struct tiny([u8]);
/// }
///
/// impl tiny {
///     pub fn from_slice(slice: &[u8]) -> &Self {
///         Self::__from_macro_new_unchecked(slice)
///     }
/// }
///
/// let data = [0x20, 0x00, 0x00, 0x20, 0x00, 0x00, 0x08, 0x00];
/// let _ = tiny::from_slice(&data);
/// ```
#[macro_export]
macro_rules! byte_wrapper {
    (
        pub struct $name:ident([u8])$(;)*
    ) => {
        byte_wrapper! {
            @pub struct $name([u8])
        }
    };
    (
        $( #[$attr:meta] )*
        pub struct $name:ident([u8])$(;)*
    ) => {
        byte_wrapper! {
            @$( #[$attr] )*
            pub struct $name([u8])
        }
    };
    (
        @$( #[$attr:meta] )*
        pub struct $name:ident([u8])
    ) => {
        #[allow(non_camel_case_types)]
        #[repr(transparent)]
        $( #[$attr] )*
        pub struct $name([u8]);

        impl $name {
            #[allow(dead_code)]
            fn __from_macro_new_unchecked(data: &[u8]) -> &Self {
                // SAFETY: this is safe due to repr(transparent)
                unsafe { &*(data as *const _ as *const Self) }
            }

            #[allow(dead_code)]
            fn __from_macro_new_unchecked_mut(data: &mut [u8]) -> &mut Self {
                // SAFETY: this is safe due to repr(transparent)
                unsafe { &mut *(data as *mut _ as *mut Self) }
            }
        }
    }
}

#[macro_export]
#[doc(hidden)]
#[cfg(feature = "log")]
macro_rules! net_log {
    (trace, $($arg:expr),*) => { ::log::trace!($($arg),*); };
    (debug, $($arg:expr),*) => { ::log::debug!($($arg),*); };
}

#[macro_export]
#[doc(hidden)]
#[cfg(not(feature = "log"))]
macro_rules! net_log {
    ($level:ident, $($arg:expr),*) => { { $( let _ = &$arg; )* } }
}

/// Emit a trace-level diagnostic through the `log` crate, if enabled.
///
/// Without the `log` feature the arguments are evaluated and dropped.
#[macro_export]
macro_rules! net_trace {
    ($($arg:expr),*) => ($crate::net_log!(trace, $($arg),*));
}

/// Emit a debug-level diagnostic through the `log` crate, if enabled.
///
/// Without the `log` feature the arguments are evaluated and dropped.
#[macro_export]
macro_rules! net_debug {
    ($($arg:expr),*) => ($crate::net_log!(debug, $($arg),*));
}
