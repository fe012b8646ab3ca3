use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_stream_word, StreamWord};
use crate::error::{Result, WordError};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete stream words from any `Read` source.
///
/// Short reads are retried until a whole word has arrived.
pub struct StreamWordReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> StreamWordReader<T> {
    /// Create a new stream word reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the next complete word (blocking).
    ///
    /// Returns `Err(WordError::StreamClosed)` when EOF is reached.
    pub fn read_word(&mut self) -> Result<StreamWord> {
        loop {
            if let Some(word) = decode_stream_word(&mut self.buf)? {
                return Ok(word);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WordError::Io(err)),
            };

            if read == 0 {
                return Err(WordError::StreamClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read words until the source is exhausted.
    ///
    /// A clean EOF on a word boundary ends the sequence; EOF inside a word
    /// is reported as `StreamClosed`.
    pub fn read_all(&mut self) -> Result<Vec<StreamWord>> {
        let mut words = Vec::new();
        loop {
            match self.read_word() {
                Ok(word) => words.push(word),
                Err(WordError::StreamClosed) if self.buf.is_empty() => return Ok(words),
                Err(err) => return Err(err),
            }
        }
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
