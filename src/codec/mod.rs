//! Compression codec support for archive entries.
//!
//! ZIP entry data is compressed with raw deflate streams. Compressor
//! instances carry large internal tables, so they are pooled and reset
//! between entries instead of being reallocated per file; see
//! [`DeflatePool`].

pub mod deflate;

pub use deflate::{DeflateHandle, DeflatePool};

/// ZIP compression method identifiers.
pub mod method {
    /// No compression (used for directory entries).
    pub const STORED: u16 = 0;
    /// Deflate compression (used for file entries).
    pub const DEFLATE: u16 = 8;
}
