//! # portzip
//!
//! A ZIP archiver with platform-portable entry names.
//!
//! Archives built on one platform often fail to round-trip their file
//! names on another: NFD-decomposing filesystems emit decomposed
//! Unicode that other tools display as broken accents, and legacy
//! Windows tools expect names in a code page such as Shift_JIS instead
//! of UTF-8. This crate writes ZIP archives whose entry names survive
//! those transitions: names are NFC-normalized, optionally re-encoded
//! into a legacy encoding, and flagged correctly, while entry data
//! streams through pooled deflate compressors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portzip::{Result, WriteOptions, Writer};
//! use std::fs::File;
//!
//! fn main() -> Result<()> {
//!     let out = File::create("project.zip")?;
//!     let mut writer = Writer::new(out, WriteOptions::default());
//!
//!     // Walks the tree depth-first; directories get trailing-slash
//!     // entries, files are deflate-compressed.
//!     writer.write_entry("src")?;
//!     writer.write_entry("README.md")?;
//!
//!     // Writes the central directory and seals the archive.
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Legacy Encodings
//!
//! For archives consumed by tools that predate the ZIP UTF-8 flag,
//! entry names can be stored in Shift_JIS. Conversion is strict: a name
//! containing a character with no Shift_JIS mapping fails the whole
//! run rather than silently mangling the name.
//!
//! ```rust,no_run
//! use portzip::{Result, TargetEncoding, WriteOptions, Writer};
//! use std::fs::File;
//!
//! fn main() -> Result<()> {
//!     let options = WriteOptions::new()
//!         .target_encoding(TargetEncoding::ShiftJis)
//!         .level(9)?;
//!
//!     let mut writer = Writer::new(File::create("日本語.zip")?, options);
//!     writer.write_entry("資料")?;
//!     writer.finish()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | The `portzip` command-line tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`; see [`Error`] for the failure
//! modes and the [`error`] module docs for handling patterns.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod encoding;
pub mod entry_name;
pub mod error;
pub mod timestamp;
pub mod write;

pub use encoding::TargetEncoding;
pub use entry_name::EntryName;
pub use error::{Error, Result};
pub use timestamp::DosDateTime;
pub use write::{WriteOptions, Writer};
