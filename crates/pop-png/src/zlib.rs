//! zlib stream made of uncompressed (stored) DEFLATE blocks

use crate::adler::adler32;

/// CMF: deflate, 32K window. FLG: default level, FCHECK so the pair is a multiple of 31.
pub const ZLIB_HEADER: [u8; 2] = [0x78, 0x9C];

/// Largest payload one stored block can carry
pub const MAX_STORED_BLOCK: usize = 0xFFFF;

/// Per-block overhead: BFINAL/BTYPE byte plus LEN and NLEN
const BLOCK_OVERHEAD: usize = 5;

/// Size of the stream [`deflate_stored`] produces for `data_len` input bytes
pub fn stored_len(data_len: usize) -> Option<usize> {
    let blocks = data_len.div_ceil(MAX_STORED_BLOCK).max(1);
    blocks
        .checked_mul(BLOCK_OVERHEAD)?
        .checked_add(data_len)?
        .checked_add(ZLIB_HEADER.len() + 4)
}

/// Wrap `data` in a zlib container without compressing it
///
/// An empty input still produces one (empty) final block.
pub fn deflate_stored(data: &[u8]) -> Vec<u8> {
    let blocks = data.len().div_ceil(MAX_STORED_BLOCK).max(1);
    let mut out = Vec::with_capacity(ZLIB_HEADER.len() + data.len() + blocks * BLOCK_OVERHEAD + 4);
    out.extend_from_slice(&ZLIB_HEADER);

    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        write_block(&mut out, &[], true);
    }
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        write_block(&mut out, chunk, last);
    }

    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn write_block(out: &mut Vec<u8>, chunk: &[u8], last: bool) {
    // BTYPE 00 in bits 1-2, BFINAL in bit 0; the rest of the byte is padding.
    out.push(u8::from(last));
    let len = chunk.len() as u16;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(chunk);
}
