//! Pooled streaming deflate compression.
//!
//! Deflate compressors allocate sizeable internal state (window, hash
//! chains), so creating one per archive entry is wasteful for archives
//! with many files. [`DeflatePool`] keeps finished compressors on a
//! mutex-guarded free list; [`DeflatePool::acquire`] rebinds an idle
//! instance to a new output sink, or constructs a fresh one when the
//! list is empty.
//!
//! A [`DeflateHandle`] exclusively owns its compressor for the duration
//! of one entry. The handle's lifecycle is guarded internally: closing
//! twice is a no-op, and writing after close fails with
//! [`Error::UseAfterClose`] rather than corrupting the stream. The
//! guard makes these guarantees hold even for callers that share a
//! handle across threads, although the archive writer itself is a
//! single producer.

use std::io::{self, Write};
use std::sync::Mutex;

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::{Error, Result};

/// Output scratch buffer size for the compress loop.
const OUT_BUF_SIZE: usize = 32 * 1024;

/// A free list of reusable raw-deflate compressors.
///
/// The pool is keyed only by algorithm; the compression level is fixed
/// for the lifetime of the pool (one archive run uses one level), so a
/// single list suffices.
///
/// # Example
///
/// ```
/// use portzip::codec::DeflatePool;
///
/// let pool = DeflatePool::new(6)?;
/// let mut out = Vec::new();
/// let handle = pool.acquire(&mut out);
/// handle.write_bytes(b"entry data")?;
/// handle.close()?;
/// assert_eq!(pool.idle(), 1);
/// # Ok::<(), portzip::Error>(())
/// ```
#[derive(Debug)]
pub struct DeflatePool {
    level: Compression,
    free: Mutex<Vec<Compress>>,
}

impl DeflatePool {
    /// Creates a pool producing compressors at the given level (0-9).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] for levels above 9.
    pub fn new(level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        Ok(Self::with_compression(Compression::new(level)))
    }

    /// Infallible constructor for callers holding an already-validated
    /// level.
    pub(crate) fn with_compression(level: Compression) -> Self {
        Self {
            level,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns the configured compression level.
    pub fn level(&self) -> u32 {
        self.level.level()
    }

    /// Returns the number of idle compressors currently pooled.
    pub fn idle(&self) -> usize {
        self.free.lock().expect("deflate pool lock poisoned").len()
    }

    /// Borrows a compressor bound to `sink` for one entry's output.
    ///
    /// Pops an idle instance if one is available (its internal tables
    /// are reused; only the stream state was reset on release), or
    /// constructs a fresh raw-deflate compressor otherwise.
    pub fn acquire<W: Write>(&self, sink: W) -> DeflateHandle<'_, W> {
        let compressor = self
            .free
            .lock()
            .expect("deflate pool lock poisoned")
            .pop()
            // false: raw deflate, no zlib header, as ZIP requires
            .unwrap_or_else(|| Compress::new(self.level, false));

        DeflateHandle {
            pool: self,
            state: Mutex::new(Some(HandleState {
                compressor,
                sink,
                out: vec![0u8; OUT_BUF_SIZE].into_boxed_slice(),
            })),
        }
    }

    /// Resets a compressor and returns it to the free list.
    fn release(&self, mut compressor: Compress) {
        compressor.reset();
        self.free
            .lock()
            .expect("deflate pool lock poisoned")
            .push(compressor);
    }
}

/// Live state of an open handle; `None` once closed.
struct HandleState<W> {
    compressor: Compress,
    sink: W,
    out: Box<[u8]>,
}

/// A pooled compressor bound to exactly one entry's output sink.
///
/// Obtained from [`DeflatePool::acquire`]. Call [`write_bytes`] to
/// stream entry data through the compressor and [`close`] to flush the
/// deflate stream and return the compressor to the pool.
///
/// [`write_bytes`]: DeflateHandle::write_bytes
/// [`close`]: DeflateHandle::close
pub struct DeflateHandle<'pool, W: Write> {
    pool: &'pool DeflatePool,
    /// Guards write and close against concurrent misuse.
    state: Mutex<Option<HandleState<W>>>,
}

impl<W: Write> DeflateHandle<'_, W> {
    /// Compresses `buf` into the bound sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseAfterClose`] if the handle was already
    /// closed, or [`Error::Io`] if the sink rejects the compressed
    /// output.
    pub fn write_bytes(&self, buf: &[u8]) -> Result<()> {
        let mut guard = self.state.lock().expect("deflate handle lock poisoned");
        let state = guard.as_mut().ok_or(Error::UseAfterClose)?;

        let mut input = buf;
        while !input.is_empty() {
            let consumed_before = state.compressor.total_in();
            let produced_before = state.compressor.total_out();

            let status = state
                .compressor
                .compress(input, &mut state.out, FlushCompress::None)
                .map_err(io::Error::other)?;
            debug_assert!(!matches!(status, Status::StreamEnd));

            let consumed = (state.compressor.total_in() - consumed_before) as usize;
            let produced = (state.compressor.total_out() - produced_before) as usize;

            state.sink.write_all(&state.out[..produced])?;
            input = &input[consumed..];
        }
        Ok(())
    }

    /// Finishes the deflate stream, flushes the sink, and returns the
    /// compressor to the pool.
    ///
    /// Closing an already-closed handle is a no-op and returns `Ok`.
    /// The compressor is returned to the pool even when flushing the
    /// sink fails, so a failed entry does not leak the instance.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.state.lock().expect("deflate handle lock poisoned");
        let Some(mut state) = guard.take() else {
            return Ok(());
        };

        let result = Self::finish_stream(&mut state);
        self.pool.release(state.compressor);
        result
    }

    /// Returns whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.state
            .lock()
            .expect("deflate handle lock poisoned")
            .is_none()
    }

    fn finish_stream(state: &mut HandleState<W>) -> Result<()> {
        loop {
            let produced_before = state.compressor.total_out();
            let status = state
                .compressor
                .compress(&[], &mut state.out, FlushCompress::Finish)
                .map_err(io::Error::other)?;

            let produced = (state.compressor.total_out() - produced_before) as usize;
            state.sink.write_all(&state.out[..produced])?;

            if matches!(status, Status::StreamEnd) {
                break;
            }
        }
        state.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Write for DeflateHandle<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for DeflateHandle<'_, W> {
    /// Returns an abandoned compressor to the pool without finishing
    /// the stream. An unterminated entry is already an error path; the
    /// instance itself is still reusable after a reset.
    fn drop(&mut self) {
        if let Ok(mut guard) = self.state.lock() {
            if let Some(state) = guard.take() {
                self.pool.release(state.compressor);
            }
        }
    }
}
