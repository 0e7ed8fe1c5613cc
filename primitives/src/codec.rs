//! Deterministic serialization for blocks.
//!
//! All numeric values are little-endian. A block encodes to a fixed
//! 82-byte record:
//!
//! ```text
//! [codec_version: u16] [parent_id: 32] [height: u64] [timestamp: u64] [payload: 32]
//! ```
//!
//! The identifier of a block is the SHA-256 of exactly these bytes, so the
//! encoding must never change for a given codec version.

use alloc::format;
use alloc::vec::Vec;
use crate::block::BlockContents;
use crate::error::{ChainError, ChainResult};
use crate::types::{BlockId, Payload, DATA_LEN};

/// Current block codec version.
pub const CODEC_VERSION: u16 = 0;

/// Length of an encoded block.
pub const BLOCK_ENCODED_LEN: usize = 2 + 32 + 8 + 8 + DATA_LEN;

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> ChainResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(ChainError::Codec("unexpected end of data".into()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u16(&mut self) -> ChainResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u64(&mut self) -> ChainResult<u64> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_id(&mut self) -> ChainResult<BlockId> {
        let bytes = self.read_bytes(32)?;
        let mut id = [0u8; 32];
        id.copy_from_slice(bytes);
        Ok(id)
    }

    fn read_payload(&mut self) -> ChainResult<Payload> {
        let bytes = self.read_bytes(DATA_LEN)?;
        let mut payload = [0u8; DATA_LEN];
        payload.copy_from_slice(bytes);
        Ok(payload)
    }

    /// Fails if any input is left unread.
    fn finish(self) -> ChainResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ChainError::Codec(format!("{} trailing bytes", n))),
        }
    }
}

// ── Encoding helpers ──

fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Encode block contents to deterministic bytes.
pub fn encode_block(contents: &BlockContents) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BLOCK_ENCODED_LEN);

    write_u16(&mut buf, CODEC_VERSION);
    buf.extend_from_slice(&contents.parent_id);
    write_u64(&mut buf, contents.height);
    write_u64(&mut buf, contents.timestamp);
    buf.extend_from_slice(&contents.payload);

    buf
}

/// Decode block contents from bytes.
///
/// Rejects unknown codec versions, truncated input, and trailing bytes.
pub fn decode_block(data: &[u8]) -> ChainResult<BlockContents> {
    let mut r = Reader::new(data);

    let version = r.read_u16()?;
    if version != CODEC_VERSION {
        return Err(ChainError::UnsupportedCodecVersion(version));
    }

    let contents = BlockContents {
        parent_id: r.read_id()?,
        height: r.read_u64()?,
        timestamp: r.read_u64()?,
        payload: r.read_payload()?,
    };
    r.finish()?;

    Ok(contents)
}
