//! Presentation format parsing for domain names.

use super::{push_label, Name, NameBuf};
use crate::error::{Error, Result};
use crate::MAX_LABEL_LENGTH;
use smallvec::SmallVec;

impl Name {
    /// Parses a name in presentation format.
    ///
    /// `\X` escapes a literal character and `\DDD` a decimal byte value.
    /// A name without a trailing dot is relative; it is appended to `origin`
    /// when one is supplied. `@` stands for the origin itself.
    pub fn parse(text: &str, origin: Option<&Name>) -> Result<Self> {
        if text == "@" {
            return origin
                .cloned()
                .ok_or_else(|| Error::bad_name(text, "@ used without an origin"));
        }
        if text == "." {
            return Ok(Self::root());
        }
        if text.is_empty() {
            return Err(Error::bad_name(text, "empty name"));
        }

        let mut wire = NameBuf::new();
        let mut count = 0usize;
        let mut label = SmallVec::<[u8; 64]>::new();
        let mut escaped_label = false;
        let mut absolute = false;
        let mut bytes = text.bytes().peekable();

        while let Some(byte) = bytes.next() {
            match byte {
                b'\\' => {
                    let first = bytes
                        .next()
                        .ok_or_else(|| Error::bad_name(text, "dangling escape"))?;
                    let value = if first.is_ascii_digit() {
                        let mut value = u32::from(first - b'0');
                        for _ in 0..2 {
                            match bytes.next() {
                                Some(d) if d.is_ascii_digit() => {
                                    value = value * 10 + u32::from(d - b'0');
                                }
                                _ => return Err(Error::bad_name(text, "bad \\DDD escape")),
                            }
                        }
                        u8::try_from(value)
                            .map_err(|_| Error::bad_name(text, "escape value above 255"))?
                    } else {
                        first
                    };
                    label.push(value);
                    escaped_label = true;
                }
                b'.' => {
                    if label.is_empty() {
                        return Err(Error::EmptyLabel { position: count });
                    }
                    finish_label(text, &mut wire, &label, escaped_label, count)?;
                    count += 1;
                    label.clear();
                    escaped_label = false;
                    if bytes.peek().is_none() {
                        absolute = true;
                    }
                }
                _ => label.push(byte),
            }

            if label.len() > MAX_LABEL_LENGTH {
                return Err(Error::label_too_long(label.len()));
            }
        }

        if !label.is_empty() {
            finish_label(text, &mut wire, &label, escaped_label, count)?;
            count += 1;
        }

        if absolute {
            wire.push(0);
            count += 1;
        }

        let name = Self::checked(wire, count)?;
        match origin {
            Some(origin) if !absolute => name.concatenate(origin),
            _ => Ok(name),
        }
    }
}

/// Appends a finished label, rejecting an unescaped `*` outside the first
/// position.
fn finish_label(
    text: &str,
    wire: &mut NameBuf,
    label: &[u8],
    escaped: bool,
    position: usize,
) -> Result<()> {
    if label == b"*" && !escaped && position > 0 {
        return Err(Error::bad_name(text, "wildcard label must come first"));
    }
    push_label(wire, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::str::FromStr;

    #[test]
    fn test_parse_relative_and_origin() {
        let origin = Name::from_str("example.com.").unwrap();

        let relative = Name::parse("www", None).unwrap();
        assert!(!relative.is_absolute());
        assert_eq!(relative.label_count(), 1);

        let joined = Name::parse("www", Some(&origin)).unwrap();
        assert_eq!(joined.to_string(), "www.example.com.");

        let absolute = Name::parse("mail.example.org.", Some(&origin)).unwrap();
        assert_eq!(absolute.to_string(), "mail.example.org.");

        assert_eq!(Name::parse("@", Some(&origin)).unwrap(), origin);
        assert!(Name::parse("@", None).unwrap_err().is_text_parse());
    }

    #[test]
    fn test_parse_escapes() {
        let name = Name::parse("a\\.b.c\\032d.", None).unwrap();
        let labels: Vec<_> = name.labels().map(|l| l.as_bytes().to_vec()).collect();
        assert_eq!(labels[0], b"a.b");
        assert_eq!(labels[1], b"c d");
        assert_eq!(name.to_string(), "a\\.b.c\\032d.");

        let high = Name::parse("\\200\\001.", None).unwrap();
        assert_eq!(high.label(0).unwrap().as_bytes(), &[200, 1]);
    }

    #[test]
    fn test_text_round_trip() {
        for text in [".", "example.com.", "a\\.b\\\\c.", "\\000\\255x.", "x\\@y\\;z."] {
            let name = Name::parse(text, None).unwrap();
            let again = Name::parse(&name.to_string(), None).unwrap();
            assert_eq!(again, name, "{text}");
            assert_eq!(again.as_wire(), name.as_wire());
        }
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", ".example.com", "a..b", "a\\25", "a\\256", "a\\", "a.*.b", "a..", "a.b.."] {
            let err = Name::parse(bad, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TextParse, "{bad}: {err}");
        }
    }

    #[test]
    fn test_wildcard_position() {
        assert!(Name::parse("*.example.com.", None).unwrap().is_wildcard());
        // An escaped asterisk is an ordinary label.
        assert!(Name::parse("a.\\*.b.", None).is_ok());
    }
}
