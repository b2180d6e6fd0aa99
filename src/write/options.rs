//! Write options and configuration for archive creation.

use crate::encoding::TargetEncoding;
use crate::{Error, Result};

/// Options for creating archives.
///
/// Options are immutable for the lifetime of a [`Writer`]: they are
/// taken by value when the writer is constructed and cannot change once
/// the first entry has been written, so every entry in one archive run
/// is named and compressed under the same policy.
///
/// # Example
///
/// ```
/// use portzip::{TargetEncoding, WriteOptions};
///
/// let options = WriteOptions::new()
///     .exclude_dotfiles(true)
///     .target_encoding(TargetEncoding::ShiftJis)
///     .level(9)?;
/// assert_eq!(options.compression_level(), 9);
/// # Ok::<(), portzip::Error>(())
/// ```
///
/// [`Writer`]: crate::Writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub(crate) normalize: bool,
    pub(crate) target_encoding: TargetEncoding,
    pub(crate) exclude_ds_store: bool,
    pub(crate) exclude_dotfiles: bool,
    pub(crate) use_utc: bool,
    pub(crate) level: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            target_encoding: TargetEncoding::Utf8,
            exclude_ds_store: true,
            exclude_dotfiles: false,
            use_utc: false,
            level: 6,
        }
    }
}

impl WriteOptions {
    /// Creates options with the default settings: NFC normalization on,
    /// UTF-8 names, `.DS_Store` excluded, dotfiles included, local-time
    /// timestamps, compression level 6.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables NFC normalization of entry names.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sets the entry-name encoding stored in the archive.
    pub fn target_encoding(mut self, target: TargetEncoding) -> Self {
        self.target_encoding = target;
        self
    }

    /// Enables or disables skipping `.DS_Store` files (matched
    /// case-insensitively).
    pub fn exclude_ds_store(mut self, exclude: bool) -> Self {
        self.exclude_ds_store = exclude;
        self
    }

    /// Enables or disables skipping files whose name starts with `.`.
    pub fn exclude_dotfiles(mut self, exclude: bool) -> Self {
        self.exclude_dotfiles = exclude;
        self
    }

    /// Stores modification times as UTC calendar fields instead of the
    /// local wall clock.
    pub fn use_utc(mut self, use_utc: bool) -> Self {
        self.use_utc = use_utc;
        self
    }

    /// Sets the deflate compression level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] for levels above 9.
    pub fn level(self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        Ok(Self { level, ..self })
    }
}

// Accessors mainly for callers assembling diagnostics; the writer reads
// the fields directly.
impl WriteOptions {
    /// Returns whether NFC normalization is enabled.
    pub fn is_normalizing(&self) -> bool {
        self.normalize
    }

    /// Returns the configured entry-name encoding.
    pub fn encoding(&self) -> TargetEncoding {
        self.target_encoding
    }

    /// Returns the configured compression level.
    pub fn compression_level(&self) -> u32 {
        self.level
    }
}
