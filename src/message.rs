//! The structure-message layer (§4.D): a `(tag, fields)` pair carried as one chunked payload
//! whose first two bytes are a `0xB0+n` structure header and the message tag.

use crate::chunking::{read_framed, write_framed};
use crate::error::{BoltError, BoltResult};
use crate::packstream::{Packer, Unpacker, Value};
use crate::wire::{Transport, Wire};

/// A message may carry at most this many fields; a structure header declaring more is rejected
/// before any field is unpacked.
pub const MAX_FIELDS: usize = 15;

/// Known message tags (§3).
pub mod tag {
    pub const HELLO: u8 = 0x01;
    pub const GOODBYE: u8 = 0x02;
    pub const RUN: u8 = 0x10;
    pub const PULL: u8 = 0x3F;
    pub const SUCCESS: u8 = 0x70;
    pub const RECORD: u8 = 0x71;
    pub const FAILURE: u8 = 0x7F;
    pub const IGNORED: u8 = 0x7E;
}

/// A decoded `(tag, fields)` message.
#[derive(Debug)]
pub struct Message {
    pub tag: u8,
    pub fields: Vec<Value>,
}

/// Encodes `(tag, fields)` and hands the framed bytes to the chunker. Does not flush; the
/// caller decides when to `send()`.
pub fn write_message<S: Transport>(wire: &mut Wire<S>, tag: u8, fields: &[Value]) -> BoltResult<()> {
    if fields.len() > MAX_FIELDS {
        return Err(BoltError::Malformed("message has more than 15 fields"));
    }
    let mut packer = Packer::new();
    packer.pack_structure_header(fields.len() as u8, tag)?;
    for field in fields {
        packer.pack(field)?;
    }
    write_framed(wire, &packer.into_bytes());
    Ok(())
}

/// Reads one framed payload and parses it as a structure message.
pub fn read_message<S: Transport>(wire: &mut Wire<S>) -> BoltResult<Message> {
    let bytes = read_framed(wire)?;
    let mut unpacker = Unpacker::new(&bytes);
    let header = unpacker.read_raw_u8()?;
    if header & 0xF0 != crate::packstream::marker::STRUCTURE {
        return Err(BoltError::Malformed("message does not start with a structure header"));
    }
    let n = (header & 0x0F) as usize;
    if n > MAX_FIELDS {
        return Err(BoltError::Malformed("structure header declares more than 15 fields"));
    }
    let tag = unpacker.read_raw_u8()?;
    let mut fields = Vec::with_capacity(n);
    for _ in 0..n {
        fields.push(unpacker.unpack()?);
    }
    if unpacker.remaining() != 0 {
        return Err(BoltError::Malformed("trailing bytes after message fields"));
    }
    Ok(Message { tag, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packstream::Map;
    use crate::wire::mock::MockStream;

    fn wire_with(inbound: &[u8]) -> Wire<MockStream> {
        let mut stream = MockStream::new();
        stream.push_inbound(inbound);
        Wire::from_stream(stream)
    }

    #[test]
    fn too_many_fields_is_rejected_on_encode() {
        let mut wire = wire_with(&[]);
        let fields: Vec<Value> = (0..16).map(Value::Integer).collect();
        let err = write_message(&mut wire, tag::RUN, &fields).unwrap_err();
        assert!(matches!(err, BoltError::Malformed(_)));
    }

    #[test]
    fn hello_message_roundtrips_through_the_wire_codec() {
        let mut client_wire = wire_with(&[]);

        let mut extra = Map::new();
        extra.insert("user_agent", Value::String("bolt4/0.1".into()));
        extra.insert("scheme", Value::String("basic".into()));
        extra.insert("principal", Value::String("neo4j".into()));
        extra.insert("credentials", Value::String("secret".into()));

        write_message(&mut client_wire, tag::HELLO, &[Value::Map(extra.clone())]).unwrap();
        client_wire.send().unwrap();

        // What the client wrote becomes what the server side reads back.
        let on_the_wire = client_wire.into_stream().outbound;
        let mut server_wire = wire_with(&on_the_wire);

        let msg = read_message(&mut server_wire).unwrap();
        assert_eq!(msg.tag, tag::HELLO);
        assert_eq!(msg.fields, vec![Value::Map(extra)]);
    }

    #[test]
    fn message_header_shape() {
        let mut extra = Map::new();
        extra.insert("n", Value::Integer(-1));
        let mut packer = Packer::new();
        packer.pack_structure_header(1, tag::PULL).unwrap();
        packer.pack(&Value::Map(extra)).unwrap();
        let bytes = packer.into_bytes();
        assert_eq!(bytes[0], 0xB1);
        assert_eq!(bytes[1], tag::PULL);
    }
}
