//! Macro for implementing Display and FromStr for wire-level enums
//!
//! The server spells enum values in PascalCase (`RanToCompletion`); the macro
//! keeps that spelling for `Display` and accepts any casing in `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use nexus_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Queued,
//!     Done,
//! }
//!
//! impl_wire_name_conversions!(Phase {
//!     Queued => "Queued",
//!     Done => "Done",
//! });
//!
//! assert_eq!("done".parse::<Phase>().unwrap(), Phase::Done);
//! assert_eq!(Phase::Queued.to_string(), "Queued");
//! ```

/// Implements Display and FromStr traits for wire-level enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        Pending,
        RanToCompletion,
    }

    impl_wire_name_conversions!(TestStatus {
        Pending => "Pending",
        RanToCompletion => "RanToCompletion",
    });

    #[test]
    fn test_display_keeps_wire_spelling() {
        assert_eq!(TestStatus::Pending.to_string(), "Pending");
        assert_eq!(TestStatus::RanToCompletion.to_string(), "RanToCompletion");
    }

    #[test]
    fn test_fromstr_any_case() {
        assert_eq!(TestStatus::from_str("pending").unwrap(), TestStatus::Pending);
        assert_eq!(TestStatus::from_str("RANTOCOMPLETION").unwrap(), TestStatus::RanToCompletion);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestStatus::from_str("Faulted");
        assert!(result.unwrap_err().contains("Invalid TestStatus: Faulted"));
    }
}
