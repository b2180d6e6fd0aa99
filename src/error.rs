//! Error types for ZIP archive creation.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when building an archive, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use portzip::{Result, WriteOptions, Writer};
//! use std::fs::File;
//!
//! fn archive_directory(zip: &str, dir: &str) -> Result<()> {
//!     let out = File::create(zip)?;
//!     let mut writer = Writer::new(out, WriteOptions::default());
//!     writer.write_entry(dir)?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! For fine-grained handling, match on specific variants:
//!
//! ```rust
//! use portzip::Error;
//!
//! fn print_user_message(error: &Error) {
//!     match error {
//!         Error::Io(e) => println!("File error: {}", e),
//!         Error::PathNotFound { path } => {
//!             println!("No such file or directory: {}", path.display());
//!         }
//!         Error::Unrepresentable { path, character, encoding } => {
//!             println!(
//!                 "'{}' in {} cannot be represented in {}",
//!                 character, path, encoding
//!             );
//!         }
//!         _ => println!("Error: {}", error),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// The main error type for archive-writing operations.
///
/// Each variant carries the context needed to diagnose the failure,
/// in particular the offending filesystem path where one is known.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading a source file or writing the
    /// archive stream.
    ///
    /// Common causes include permission denied, disk full, and a source
    /// file vanishing between the walk and the open.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A path handed to the walker does not exist.
    ///
    /// Distinguished from generic [`Io`][Self::Io] failures so callers can
    /// report the specific missing path.
    #[error("no such file or directory: {path}", path = .path.display())]
    PathNotFound {
        /// The path that could not be found.
        path: PathBuf,
    },

    /// An entry name contains a character with no mapping in the target
    /// encoding.
    ///
    /// Conversion is atomic: no partial name is produced and the entry is
    /// not written. The whole walk aborts, for directories as well as
    /// files.
    #[error("character '{character}' in [{path}] is not representable in {encoding}")]
    Unrepresentable {
        /// The archive path that failed to convert.
        path: String,
        /// The first offending character.
        character: char,
        /// The name of the target encoding.
        encoding: &'static str,
    },

    /// A compressor handle was written to after it was closed.
    ///
    /// Closing a handle twice is a harmless no-op; writing after close is
    /// an internal misuse and fails deterministically.
    #[error("write after close on compressor handle")]
    UseAfterClose,

    /// The writer was used after `finish()`.
    ///
    /// The archive writer is single-use: once the central directory has
    /// been written, no further entries may be added.
    #[error("archive already finished")]
    ArchiveFinished,

    /// An invalid compression level was provided.
    ///
    /// Compression levels must be in the range 0-9:
    /// - 0: No compression
    /// - 1-5: Faster compression, lower ratio
    /// - 6: Balanced (default)
    /// - 7-9: Maximum compression, slower
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },

    /// A filesystem path produced an invalid archive entry name.
    ///
    /// Entry names must be non-empty, relative, slash-separated paths.
    /// Paths that clean to `.` or escape upward cannot name an entry.
    #[error("invalid entry name: {0}")]
    InvalidEntryName(String),
}

impl Error {
    /// Creates a [`PathNotFound`][Self::PathNotFound] error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Creates an [`Unrepresentable`][Self::Unrepresentable] error.
    pub fn unrepresentable(
        path: impl Into<String>,
        character: char,
        encoding: &'static str,
    ) -> Self {
        Error::Unrepresentable {
            path: path.into(),
            character,
            encoding,
        }
    }

    /// Returns `true` if this error was caused by a missing source path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::PathNotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates misuse of the writer or a
    /// handle rather than an environmental failure.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::UseAfterClose
                | Error::ArchiveFinished
                | Error::InvalidCompressionLevel { .. }
        )
    }

    /// Returns the offending path associated with this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::PathNotFound { path } => path.to_str(),
            Error::Unrepresentable { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
