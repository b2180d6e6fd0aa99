//! Archive writer.
//!
//! [`Writer`] streams a ZIP archive to any [`Write`] sink: local file
//! headers and deflate data as entries are walked, then the central
//! directory and end-of-central-directory record on [`finish`]. Because
//! entry data is compressed as it streams, sizes and CRCs are not known
//! when the local header goes out; file entries use the trailing data
//! descriptor convention (general-purpose flag bit 3) so the sink never
//! needs to seek.
//!
//! Entries are added per root path with [`write_entry`], which walks
//! the path depth-first in pre-order. The error policy is fail-fast:
//! the first failure aborts the walk and leaves the archive truncated
//! mid-stream, so callers should discard the output on error.
//!
//! [`finish`]: Writer::finish
//! [`write_entry`]: Writer::write_entry

mod header;
mod options;

pub use options::WriteOptions;

use std::env;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::Compression;
use log::{debug, trace};
use same_file::Handle;
use walkdir::WalkDir;

use crate::codec::{DeflatePool, method};
use crate::entry_name::EntryName;
use crate::timestamp::DosDateTime;
use crate::{Error, Result};

/// Read buffer size for streaming source files into the compressor.
const COPY_BUF_SIZE: usize = 64 * 1024;

/// MS-DOS directory attribute bit in the external attributes field.
const DOS_DIR_ATTR: u32 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Finished,
}

/// Per-entry record captured when the local header is written and
/// replayed into the central directory on finish.
pub(crate) struct PendingEntry {
    pub(crate) name: Vec<u8>,
    pub(crate) flags: u16,
    pub(crate) method: u16,
    pub(crate) mtime: DosDateTime,
    pub(crate) crc32: u32,
    pub(crate) compressed_size: u64,
    pub(crate) uncompressed_size: u64,
    pub(crate) local_header_offset: u64,
    pub(crate) external_attrs: u32,
}

/// A [`Write`] wrapper that tracks the absolute stream offset.
///
/// Header offsets in the central directory are byte positions in the
/// output stream; counting here keeps the writer seek-free.
struct CountingWriter<W: Write> {
    inner: W,
    offset: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    fn offset(&self) -> u64 {
        self.offset
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.offset += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A streaming ZIP archive writer.
///
/// Construct with [`Writer::new`], add filesystem trees with
/// [`write_entry`], and seal the archive with [`finish`]. The writer is
/// single-use: after `finish` both methods fail with
/// [`Error::ArchiveFinished`].
///
/// # Example
///
/// ```no_run
/// use portzip::{WriteOptions, Writer};
/// use std::fs::File;
///
/// let out = File::create("backup.zip")?;
/// let mut writer = Writer::new(out, WriteOptions::default());
/// writer.write_entry("photos")?;
/// writer.write_entry("notes.txt")?;
/// writer.finish()?;
/// # Ok::<(), portzip::Error>(())
/// ```
///
/// [`write_entry`]: Writer::write_entry
/// [`finish`]: Writer::finish
pub struct Writer<W: Write> {
    sink: CountingWriter<W>,
    pool: DeflatePool,
    options: WriteOptions,
    entries: Vec<PendingEntry>,
    state: WriterState,
    progress: Option<Box<dyn FnMut(&str)>>,
}

impl<W: Write> Writer<W> {
    /// Creates a writer targeting `sink` with the given options.
    pub fn new(sink: W, options: WriteOptions) -> Self {
        // The level was validated when the options were built.
        let pool = DeflatePool::with_compression(Compression::new(options.level));
        Self {
            sink: CountingWriter::new(sink),
            pool,
            options,
            entries: Vec::new(),
            state: WriterState::Open,
            progress: None,
        }
    }

    /// Installs a callback invoked with each entry name as it is
    /// written.
    pub fn with_progress(mut self, progress: impl FnMut(&str) + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Returns the options this writer was built with.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Returns the number of entries written so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of bytes emitted to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.sink.offset()
    }

    /// Walks `path` depth-first in pre-order and writes an entry for
    /// every file and directory found.
    ///
    /// The node identical to the process working directory is skipped by
    /// file identity (an archive created inside the tree being archived
    /// must not recurse into itself); its children are still visited.
    /// `.DS_Store` files are skipped case-insensitively unless disabled,
    /// and when [`WriteOptions::exclude_dotfiles`] is set any node whose
    /// own base name starts with `.` is skipped. Filtering is per node:
    /// a dot-directory loses its entry but its non-dot children are
    /// still archived. Symlinks to regular files are followed and the
    /// target's bytes archived under the link's name.
    ///
    /// # Errors
    ///
    /// Fails fast on the first error: [`Error::PathNotFound`] when
    /// `path` or a walked child does not exist,
    /// [`Error::Unrepresentable`] or [`Error::InvalidEntryName`] when a
    /// name cannot be derived, [`Error::ArchiveFinished`] after
    /// [`finish`], and [`Error::Io`] otherwise.
    ///
    /// [`finish`]: Writer::finish
    pub fn write_entry(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_open()?;
        let root = path.as_ref();
        let cwd = Handle::from_path(env::current_dir()?)?;

        for next in WalkDir::new(root).follow_links(false) {
            let entry = next.map_err(|err| walk_error(root, err))?;
            let file_type = entry.file_type();

            // Identity check, not a string comparison: the same directory
            // can be reached under many spellings.
            if file_type.is_dir() && Handle::from_path(entry.path())? == cwd {
                debug!(
                    "skipping working directory {}",
                    entry.path().display()
                );
                continue;
            }

            let base = entry.file_name().to_string_lossy();
            if self.options.exclude_ds_store && base.eq_ignore_ascii_case(".ds_store") {
                debug!("excluding {}", entry.path().display());
                continue;
            }
            // Per-node filter: a dot-directory's own entry is dropped
            // but the walk still descends into it.
            if self.options.exclude_dotfiles && base.starts_with('.') && base.len() > 1 {
                debug!("excluding dotfile {}", entry.path().display());
                continue;
            }

            let is_dir = file_type.is_dir();
            let metadata = if file_type.is_symlink() {
                // Follow the link the way the source open will: a link
                // to a regular file archives the target's bytes under
                // the link's name.
                let target = fs::metadata(entry.path()).map_err(|err| {
                    if err.kind() == io::ErrorKind::NotFound {
                        Error::path_not_found(entry.path())
                    } else {
                        Error::Io(err)
                    }
                })?;
                if !target.is_file() {
                    trace!(
                        "skipping symlink to non-file {}",
                        entry.path().display()
                    );
                    continue;
                }
                target
            } else if file_type.is_file() || is_dir {
                entry.metadata().map_err(|err| walk_error(root, err))?
            } else {
                trace!("skipping non-regular entry {}", entry.path().display());
                continue;
            };

            let name = EntryName::for_path(
                entry.path(),
                is_dir,
                self.options.normalize,
                self.options.target_encoding,
            )?;

            if is_dir {
                self.write_directory(&name, &metadata)?;
            } else {
                self.write_file(entry.path(), &name, &metadata)?;
            }

            if let Some(progress) = self.progress.as_mut() {
                progress(name.as_str());
            }
        }
        Ok(())
    }

    /// Writes the central directory and end-of-central-directory record
    /// and flushes the sink.
    ///
    /// The writer transitions to its finished state; calling `finish`
    /// again (or [`write_entry`]) fails with [`Error::ArchiveFinished`].
    ///
    /// [`write_entry`]: Writer::write_entry
    pub fn finish(&mut self) -> Result<()> {
        self.ensure_open()?;

        let cd_offset = self.sink.offset();
        for entry in &self.entries {
            self.sink
                .write_all(&header::central_directory_header(entry))?;
        }
        let cd_size = self.sink.offset() - cd_offset;

        self.sink.write_all(&header::end_of_central_directory(
            self.entries.len() as u64,
            cd_size,
            cd_offset,
        ))?;
        self.sink.flush()?;
        self.state = WriterState::Finished;

        debug!(
            "finished archive: {} entries, {} bytes",
            self.entries.len(),
            self.sink.offset()
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Finished => Err(Error::ArchiveFinished),
        }
    }

    fn write_directory(&mut self, name: &EntryName, metadata: &Metadata) -> Result<()> {
        let entry = PendingEntry {
            name: name.encoded().to_vec(),
            flags: if name.utf8_flag() { header::FLAG_UTF8 } else { 0 },
            method: method::STORED,
            mtime: self.entry_mtime(metadata),
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            local_header_offset: self.sink.offset(),
            external_attrs: (unix_mode(metadata) << 16) | DOS_DIR_ATTR,
        };

        trace!("dir  {}", name);
        self.sink.write_all(&header::local_file_header(&entry))?;
        self.entries.push(entry);
        Ok(())
    }

    fn write_file(&mut self, path: &Path, name: &EntryName, metadata: &Metadata) -> Result<()> {
        let mut flags = header::FLAG_STREAMED;
        if name.utf8_flag() {
            flags |= header::FLAG_UTF8;
        }

        let mut entry = PendingEntry {
            name: name.encoded().to_vec(),
            flags,
            method: method::DEFLATE,
            mtime: self.entry_mtime(metadata),
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            local_header_offset: self.sink.offset(),
            external_attrs: unix_mode(metadata) << 16,
        };

        self.sink.write_all(&header::local_file_header(&entry))?;
        let data_start = self.sink.offset();

        let mut source = File::open(path).map_err(|err| {
            // The file can vanish between the walk and the open.
            if err.kind() == io::ErrorKind::NotFound {
                Error::path_not_found(path)
            } else {
                Error::Io(err)
            }
        })?;

        let (crc32, uncompressed_size) = {
            let handle = self.pool.acquire(&mut self.sink);
            let mut hasher = crc32fast::Hasher::new();
            let mut total = 0u64;
            let mut buf = vec![0u8; COPY_BUF_SIZE];
            loop {
                let read = source.read(&mut buf)?;
                if read == 0 {
                    break;
                }
                hasher.update(&buf[..read]);
                total += read as u64;
                handle.write_bytes(&buf[..read])?;
            }
            handle.close()?;
            (hasher.finalize(), total)
        };

        entry.crc32 = crc32;
        entry.uncompressed_size = uncompressed_size;
        entry.compressed_size = self.sink.offset() - data_start;

        trace!(
            "file {} ({} -> {} bytes)",
            name, entry.uncompressed_size, entry.compressed_size
        );
        self.sink.write_all(&header::data_descriptor(&entry))?;
        self.entries.push(entry);
        Ok(())
    }

    fn entry_mtime(&self, metadata: &Metadata) -> DosDateTime {
        // A filesystem without mtimes gets the DOS epoch.
        match metadata.modified() {
            Ok(mtime) => DosDateTime::from_system_time(mtime, self.options.use_utc),
            Err(_) => DosDateTime { date: 0x0021, time: 0 },
        }
    }
}

/// Maps a walk failure, distinguishing missing paths.
fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = err.to_string();
    match err.into_io_error() {
        Some(io_err) if io_err.kind() == io::ErrorKind::NotFound => Error::path_not_found(path),
        Some(io_err) => Error::Io(io_err),
        None => Error::Io(io::Error::other(message)),
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn unix_mode(metadata: &Metadata) -> u32 {
    if metadata.is_dir() { 0o40755 } else { 0o100644 }
}
