use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_stream_word, StreamWord, STREAM_WORD_SIZE};
use crate::error::{Result, WordError};

/// Writes complete stream words to any `Write` sink.
pub struct StreamWordWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> StreamWordWriter<T> {
    /// Create a new stream word writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(STREAM_WORD_SIZE),
        }
    }

    /// Encode and write one word (blocking).
    pub fn write_word(&mut self, word: &StreamWord) -> Result<()> {
        self.buf.clear();
        encode_stream_word(word, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(WordError::StreamClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WordError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(WordError::Io(err)),
            }
        }
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::reader::StreamWordReader;
    use crate::tag::Tag;

    #[test]
    fn writes_three_bytes_per_word() {
        let mut writer = StreamWordWriter::new(Cursor::new(Vec::<u8>::new()));
        writer
            .write_word(&StreamWord::new(0x0102, Tag::command()))
            .unwrap();
        writer.flush().unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes, vec![0x02, 0x01, 0x04]);
    }

    #[test]
    fn roundtrip_through_reader() {
        let mut writer = StreamWordWriter::new(Vec::<u8>::new());
        for data in 0..8u16 {
            writer.write_word(&StreamWord::new(data, Tag::data())).unwrap();
        }

        let mut reader = StreamWordReader::new(Cursor::new(writer.into_inner()));
        let words = reader.read_all().unwrap();
        assert_eq!(words.len(), 8);
        assert!(words.iter().enumerate().all(|(i, w)| w.data == i as u16));
    }

    #[test]
    fn zero_length_write_is_stream_closed() {
        let mut writer = StreamWordWriter::new(ClosedSink);
        let err = writer
            .write_word(&StreamWord::new(1, Tag::command()))
            .unwrap_err();
        assert!(matches!(err, WordError::StreamClosed));
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
