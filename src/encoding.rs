//! Entry-name normalization and legacy-encoding conversion.
//!
//! Filenames that look identical can differ byte-for-byte depending on
//! which filesystem produced them: NFD-decomposing filesystems store
//! `café` as `cafe` + a combining accent, while most tools expect the
//! precomposed NFC form. [`normalize`] collapses both spellings to NFC so
//! an archive never carries two entries for what users see as one name.
//!
//! [`encode_name`] then produces the byte form stored in the archive:
//! UTF-8 (with the general-purpose flag bit 11 signalled for non-ASCII
//! names), or a legacy encoding such as Shift_JIS for tools that predate
//! the UTF-8 flag. Legacy conversion is atomic: a single unmappable
//! character fails the conversion instead of substituting.

use std::borrow::Cow;

use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfc_quick};

use crate::{Error, Result};

/// Entry-name encoding stored in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetEncoding {
    /// UTF-8 names, signalled via the UTF-8 flag bit (0x0800) in the
    /// general-purpose flags field.
    #[default]
    Utf8,
    /// Shift_JIS names for legacy Japanese Windows tools. The UTF-8 flag
    /// bit is left clear and readers interpret the raw bytes.
    ShiftJis,
}

impl TargetEncoding {
    /// Returns the canonical name of this encoding.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::ShiftJis => "Shift_JIS",
        }
    }
}

/// Normalizes a name to Unicode NFC (canonical composition).
///
/// Deterministic and infallible; already-composed input is returned
/// unchanged without allocating.
pub fn normalize(name: &str) -> Cow<'_, str> {
    match is_nfc_quick(name.chars()) {
        IsNormalized::Yes => Cow::Borrowed(name),
        _ => Cow::Owned(name.nfc().collect()),
    }
}

/// Encodes an entry name into its archived byte form.
///
/// Returns the encoded bytes and whether the entry must carry the UTF-8
/// flag bit. For [`TargetEncoding::Utf8`] the bytes are the input and the
/// flag is set exactly when the name is not pure ASCII. For
/// [`TargetEncoding::ShiftJis`] the name is re-encoded and the flag stays
/// clear.
///
/// # Errors
///
/// Returns [`Error::Unrepresentable`] naming the first offending
/// character if any code point has no mapping in the target encoding.
/// No partial output is produced.
pub fn encode_name(name: &str, target: TargetEncoding) -> Result<(Vec<u8>, bool)> {
    match target {
        TargetEncoding::Utf8 => Ok((name.as_bytes().to_vec(), !name.is_ascii())),
        TargetEncoding::ShiftJis => {
            let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(name);
            if had_errors {
                return Err(Error::unrepresentable(
                    name,
                    first_unmappable(name),
                    target.name(),
                ));
            }
            Ok((bytes.into_owned(), false))
        }
    }
}

/// Finds the first character of `name` with no Shift_JIS mapping.
fn first_unmappable(name: &str) -> char {
    let mut buf = [0u8; 4];
    for ch in name.chars() {
        let (_, _, had_errors) = encoding_rs::SHIFT_JIS.encode(ch.encode_utf8(&mut buf));
        if had_errors {
            return ch;
        }
    }
    // encode() reported an error, so some character must fail alone.
    char::REPLACEMENT_CHARACTER
}
