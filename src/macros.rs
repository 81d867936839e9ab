//! Macros to reduce boilerplate in the codebase

/// Macro to generate Display and FromStr implementations for enums, plus an
/// `ALL_STRINGS` constant listing the canonical spellings.
///
/// Parsing is case-insensitive and ignores surrounding whitespace. Extra
/// spellings can be accepted with `|`; Display always uses the first one.
///
/// # Usage
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     MyEnum,
///     DeskError::invalid_my_enum,
///     {
///         Variant1 => "variant1",
///         Variant2 => "variant2" | "v2",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_fn:path,
        { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        impl $enum_name {
            /// All canonical string representations of this enum.
            pub const ALL_STRINGS: &'static [&'static str] = &[$($str),+];
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, "{}", $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::DeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok($enum_name::$variant),)+
                    _ => Err($error_fn(s.to_string())),
                }
            }
        }
    };
}
