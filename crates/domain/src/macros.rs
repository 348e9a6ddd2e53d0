//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Status fields and configuration switches travel as lowercase strings
//! (`"open"`, `"shortlisted"`, `"android-emulator"`). This macro maps each
//! variant to a canonical spelling plus optional aliases accepted on input.
//!
//! # Example
//!
//! ```rust
//! use jobportal_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Public,
//!     Private,
//! }
//!
//! impl_wire_enum_conversions!(Visibility {
//!     Public => "public" | "open",
//!     Private => "private",
//! });
//!
//! assert_eq!("OPEN".parse::<Visibility>().unwrap(), Visibility::Public);
//! assert_eq!(Visibility::Public.to_string(), "public");
//! ```

/// Implements Display and FromStr traits for wire-level enums
///
/// - Display writes the first (canonical) spelling
/// - FromStr trims and lowercases its input, then accepts the canonical
///   spelling or any listed alias
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $canonical:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($canonical),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($canonical $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
