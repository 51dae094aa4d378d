use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks(ChunksError),
    InvalidUtf8,
}

/// Reads the `data` payloads of server-sent events from a chunk stream.
///
/// Only what chat-completion streams use is supported: `data` fields are
/// collected (multiple lines joined with `\n`), comments and other fields are
/// skipped, and an event without data is not reported.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
    eof: bool,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
            eof: false,
        }
    }

    /// Returns the data of the next event, or `None` when the stream ended.
    /// A trailing event without its blank line terminator is dropped.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            while let Some(block) = self.take_block() {
                if let Some(data) = parse_block(&block)? {
                    return Ok(Some(data));
                }
            }
            if self.eof {
                return Ok(None);
            }
            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.eof = true,
            }
        }
    }

    /// Splits off one event block (without its terminator) if the buffer
    /// holds a complete one. Bytes are kept raw until then, so a multi-byte
    /// character split across chunks is fine.
    fn take_block(&mut self) -> Option<Vec<u8>> {
        self.strip_crlf();
        let end = self.buf.windows(2).position(|w| w == b"\n\n")?;
        let block = self.buf[..end].to_vec();
        self.buf.drain(..end + 2);
        Some(block)
    }

    /// Turns `\r\n` into `\n`, so only `\n\n` has to be searched for. A
    /// trailing `\r` stays until its `\n` arrives.
    fn strip_crlf(&mut self) {
        if !self.buf.contains(&b'\r') {
            return;
        }
        let mut out = Vec::with_capacity(self.buf.len());
        for (idx, &byte) in self.buf.iter().enumerate() {
            if byte == b'\r' && self.buf.get(idx + 1) == Some(&b'\n') {
                continue;
            }
            out.push(byte);
        }
        self.buf = out;
    }
}

fn parse_block(block: &[u8]) -> Result<Option<String>, Error> {
    let block = str::from_utf8(block).map_err(|_| Error::InvalidUtf8)?;
    let mut data: Option<String> = None;
    for line in block.split('\n') {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        if field != "data" {
            continue;
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    Ok(data)
}
