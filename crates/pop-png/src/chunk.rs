//! PNG chunk framing: length, type, body, CRC

use crate::crc::Crc32;

/// Chunk type tags used by the encoder
pub mod kind {
    pub const IHDR: [u8; 4] = *b"IHDR";
    pub const IDAT: [u8; 4] = *b"IDAT";
    pub const IEND: [u8; 4] = *b"IEND";
}

/// Largest body a chunk length field may declare
pub const MAX_CHUNK_LEN: usize = 0x7FFF_FFFF;

/// A single chunk ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngChunk {
    pub kind: [u8; 4],
    pub body: Vec<u8>,
}

impl PngChunk {
    pub fn new(kind: [u8; 4], body: Vec<u8>) -> Self {
        Self { kind, body }
    }

    /// CRC over the type tag followed by the body
    pub fn crc(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.kind);
        crc.update(&self.body);
        crc.finish()
    }

    /// Bytes this chunk occupies in the file
    pub fn encoded_len(&self) -> usize {
        12 + self.body.len()
    }

    /// Append the framed chunk; the body must not exceed [`MAX_CHUNK_LEN`]
    pub fn write_to(&self, out: &mut Vec<u8>) {
        debug_assert!(self.body.len() <= MAX_CHUNK_LEN);
        out.extend_from_slice(&(self.body.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.kind);
        out.extend_from_slice(&self.body);
        out.extend_from_slice(&self.crc().to_be_bytes());
    }
}
