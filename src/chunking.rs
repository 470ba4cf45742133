//! Chunked message framing (§4.C): a payload is sent as successive `len:u16be bytes[len]`
//! chunks, terminated by a zero-length chunk. Stateless between payloads; this layer never
//! looks at the bytes it carries.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{BoltError, BoltResult};
use crate::wire::{Transport, Wire};

/// The largest chunk body this core ever emits. A transmission-simplicity cap, not a protocol
/// limit imposed by the server.
pub const MAX_CHUNK_SIZE: usize = 0x7FFF;

/// Splits `payload` into `chunk_lengths` of at most [`MAX_CHUNK_SIZE`] bytes each; the caller
/// (here, [`write_framed`]) still appends the zero-length terminator.
pub fn chunk_lengths(payload_len: usize) -> Vec<usize> {
    if payload_len == 0 {
        return vec![0];
    }
    let mut lens = Vec::new();
    let mut remaining = payload_len;
    while remaining > 0 {
        let n = remaining.min(MAX_CHUNK_SIZE);
        lens.push(n);
        remaining -= n;
    }
    lens
}

/// Writes `payload` to `wire` as a sequence of chunks followed by a zero-length terminator.
/// Does not flush; the caller decides when to `send()`.
pub fn write_framed<S: Transport>(wire: &mut Wire<S>, payload: &[u8]) {
    let mut offset = 0;
    for chunk in payload.chunks(MAX_CHUNK_SIZE) {
        let mut header = [0_u8; 2];
        BigEndian::write_u16(&mut header, chunk.len() as u16);
        wire.write(&header);
        wire.write(chunk);
        offset += chunk.len();
    }
    debug_assert_eq!(offset, payload.len());
    wire.write(&[0x00, 0x00]);
}

/// Reads one framed payload from `wire`: accumulates chunks until a zero-length chunk
/// terminates it, then returns the concatenated bytes.
pub fn read_framed<S: Transport>(wire: &mut Wire<S>) -> BoltResult<Vec<u8>> {
    let mut buf = Vec::new();
    loop {
        let header = wire.read(2)?;
        let size = BigEndian::read_u16(&header) as usize;
        if size == 0 {
            return Ok(buf);
        }
        if size > MAX_CHUNK_SIZE {
            return Err(BoltError::Malformed("chunk length exceeds 0x7FFF"));
        }
        let chunk = wire.read(size)?;
        buf.extend_from_slice(&chunk);
    }
}
