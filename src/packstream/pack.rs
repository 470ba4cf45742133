use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{BoltError, BoltResult};

use super::marker;
use super::value::{Map, Value};

/// Encodes `Value`s into an in-memory buffer using the smallest legal marker for every integer
/// and container.
#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes the `0xB0+n` structure header and tag byte that open a message (§4.D). Not a
    /// `Value` in its own right, so it bypasses `pack`.
    pub(crate) fn pack_structure_header(&mut self, field_count: u8, tag: u8) -> BoltResult<()> {
        self.buf.write_u8(marker::STRUCTURE + field_count)?;
        self.buf.write_u8(tag)?;
        Ok(())
    }

    pub fn pack(&mut self, value: &Value) -> BoltResult<()> {
        match value {
            Value::Null => {
                self.buf.write_u8(marker::NULL)?;
                Ok(())
            }
            Value::Integer(v) => self.pack_integer(*v),
            Value::String(s) => self.pack_string(s),
            Value::List(items) => self.pack_list(items),
            Value::Map(map) => self.pack_map(map),
        }
    }

    fn pack_integer(&mut self, v: i64) -> BoltResult<()> {
        if (-0x10..0x80).contains(&v) {
            self.buf.write_i8(v as i8)?;
        } else if (-0x80..-0x10).contains(&v) {
            self.buf.write_u8(marker::INT_8)?;
            self.buf.write_i8(v as i8)?;
        } else if (-0x8000..0x8000).contains(&v) {
            self.buf.write_u8(marker::INT_16)?;
            self.buf.write_i16::<BigEndian>(v as i16)?;
        } else if (-0x8000_0000..0x8000_0000).contains(&v) {
            self.buf.write_u8(marker::INT_32)?;
            self.buf.write_i32::<BigEndian>(v as i32)?;
        } else {
            self.buf.write_u8(marker::INT_64)?;
            self.buf.write_i64::<BigEndian>(v)?;
        }
        Ok(())
    }

    fn pack_header(&mut self, size: usize, tiny: u8, small: u8, medium: u8, large: u8) -> BoltResult<()> {
        if size < 0x10 {
            self.buf.write_u8(tiny + size as u8)?;
        } else if size < 0x100 {
            self.buf.write_u8(small)?;
            self.buf.write_u8(size as u8)?;
        } else if size < 0x1_0000 {
            self.buf.write_u8(medium)?;
            self.buf.write_u16::<BigEndian>(size as u16)?;
        } else if (size as u64) < 0x1_0000_0000 {
            self.buf.write_u8(large)?;
            self.buf.write_u32::<BigEndian>(size as u32)?;
        } else {
            return Err(BoltError::ContainerTooLarge(size));
        }
        Ok(())
    }

    fn pack_string(&mut self, s: &str) -> BoltResult<()> {
        let bytes = s.as_bytes();
        self.pack_header(
            bytes.len(),
            marker::TINY_STRING,
            marker::STRING_8,
            marker::STRING_16,
            marker::STRING_32,
        )?;
        self.buf.write_all(bytes)?;
        Ok(())
    }

    fn pack_list(&mut self, items: &[Value]) -> BoltResult<()> {
        self.pack_header(
            items.len(),
            marker::TINY_LIST,
            marker::LIST_8,
            marker::LIST_16,
            marker::LIST_32,
        )?;
        for item in items {
            self.pack(item)?;
        }
        Ok(())
    }

    fn pack_map(&mut self, map: &Map) -> BoltResult<()> {
        self.pack_header(
            map.len(),
            marker::TINY_MAP,
            marker::MAP_8,
            marker::MAP_16,
            marker::MAP_32,
        )?;
        for (key, value) in map.iter() {
            self.pack_string(key)?;
            self.pack(value)?;
        }
        Ok(())
    }
}
