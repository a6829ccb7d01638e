//! Table-driven IANA registries.
//!
//! Each DNS parameter registry (types, classes, opcodes, rcodes) is declared
//! as one table of `Variant = value, "MNEMONIC", "description"` rows. The
//! macro expands a table into a `#[repr]` enum with `num_enum` conversions,
//! serde support, a mnemonic lookup and `Display`.

macro_rules! iana_registry {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $( $variant:ident = $value:literal, $mnemonic:literal, $doc:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            num_enum::IntoPrimitive,
            num_enum::TryFromPrimitive,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[repr($repr)]
        #[allow(non_camel_case_types)]
        $vis enum $name {
            $( #[doc = $doc] $variant = $value, )+
        }

        impl $name {
            /// Every registered value, in table order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the presentation mnemonic.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $mnemonic, )+
                }
            }

            /// Looks up a value by mnemonic, ignoring ASCII case.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.name().eq_ignore_ascii_case(name))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub(crate) use iana_registry;

/// Parses the RFC 3597 generic form `PREFIXnnn` (`TYPE731`, `CLASS3`).
pub(crate) fn parse_generic(s: &str, prefix: &str) -> Option<u16> {
    let head = s.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let digits = &s[prefix.len()..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generic() {
        assert_eq!(parse_generic("TYPE65534", "TYPE"), Some(65534));
        assert_eq!(parse_generic("class3", "CLASS"), Some(3));
        assert_eq!(parse_generic("TYPE", "TYPE"), None);
        assert_eq!(parse_generic("TYPE+1", "TYPE"), None);
        assert_eq!(parse_generic("TYPE65536", "TYPE"), None);
        assert_eq!(parse_generic("TY", "TYPE"), None);
        assert_eq!(parse_generic("CLASS1", "TYPE"), None);
    }
}
