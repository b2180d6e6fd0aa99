//! Entry name derivation for archived filesystem paths.
//!
//! An [`EntryName`] is the canonical in-archive spelling of a walked
//! filesystem path: rebased to relative form, slash-separated, lexically
//! cleaned, optionally NFC-normalized, suffixed with `/` for directories,
//! and converted to the byte form the configured [`TargetEncoding`]
//! stores in the archive headers.

use std::path::{Component, Path};

use crate::encoding::{self, TargetEncoding};
use crate::{Error, Result};

/// A derived archive entry name, carrying both the textual form and the
/// encoded bytes written to the entry headers.
///
/// # Examples
///
/// ```
/// use portzip::{EntryName, TargetEncoding};
/// use std::path::Path;
///
/// // Absolute inputs are rebased relative to the filesystem root.
/// let name = EntryName::for_path(Path::new("/a/b/c"), false, true, TargetEncoding::Utf8)?;
/// assert_eq!(name.as_str(), "a/b/c");
///
/// // Directories carry the trailing-slash convention.
/// let dir = EntryName::for_path(Path::new("docs"), true, true, TargetEncoding::Utf8)?;
/// assert_eq!(dir.as_str(), "docs/");
/// # Ok::<(), portzip::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    name: String,
    encoded: Vec<u8>,
    utf8_flag: bool,
    is_dir: bool,
}

impl EntryName {
    /// Derives the canonical entry name for a filesystem path.
    ///
    /// The derivation pipeline:
    /// 1. Absolute paths are rebased as relative paths from the
    ///    filesystem root, so an absolute input never leaks an absolute
    ///    name into the archive.
    /// 2. Separators are canonicalized to `/` and redundant segments
    ///    (`.`, `..`, repeated separators) are collapsed lexically,
    ///    matching the path spelling the walker reads files under.
    /// 3. The name is NFC-normalized when `normalize` is set.
    /// 4. Directories receive a trailing `/`.
    /// 5. The name is converted to `target` encoding bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] for paths that clean to
    /// nothing, escape upward past their starting point, or are not valid
    /// UTF-8, and [`Error::Unrepresentable`] (with the offending path
    /// attached) when `target` cannot represent the name.
    pub fn for_path(
        path: &Path,
        is_dir: bool,
        normalize: bool,
        target: TargetEncoding,
    ) -> Result<Self> {
        let mut name = clean_to_slash(path)?;

        if normalize {
            name = encoding::normalize(&name).into_owned();
        }

        if is_dir {
            name.push('/');
        }

        let (encoded, utf8_flag) = encode_with_path(&name, target)?;

        Ok(Self {
            name,
            encoded,
            utf8_flag,
            is_dir,
        })
    }

    /// Returns the textual entry name (always slash-separated, trailing
    /// `/` for directories).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Returns the encoded name bytes stored in the archive headers.
    #[inline]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Returns whether the entry must carry the UTF-8 flag bit (0x0800).
    #[inline]
    pub fn utf8_flag(&self) -> bool {
        self.utf8_flag
    }

    /// Returns whether this names a directory entry.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

impl std::fmt::Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Rebases, cleans, and joins a path into a slash-separated name.
fn clean_to_slash(path: &Path) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();

    for component in path.components() {
        match component {
            // Rebasing: dropping the root makes an absolute path the
            // relative path from `/`.
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(Error::InvalidEntryName(format!(
                        "path escapes its root: {}",
                        path.display()
                    )));
                }
            }
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| {
                    Error::InvalidEntryName(format!("path is not valid UTF-8: {:?}", path))
                })?;
                segments.push(segment);
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::InvalidEntryName(format!(
            "path cleans to nothing: {}",
            path.display()
        )));
    }

    Ok(segments.join("/"))
}

/// Runs the encoding converter, attaching the entry name to conversion
/// failures for diagnostics.
fn encode_with_path(name: &str, target: TargetEncoding) -> Result<(Vec<u8>, bool)> {
    encoding::encode_name(name, target).map_err(|err| match err {
        Error::Unrepresentable {
            character, encoding, ..
        } => Error::unrepresentable(name, character, encoding),
        other => other,
    })
}
