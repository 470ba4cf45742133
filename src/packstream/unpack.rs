use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{BoltError, BoltResult};

use super::marker;
use super::value::{Map, Value};

/// Decodes `Value`s from an in-memory byte buffer (one fully assembled, de-chunked message
/// body).
pub struct Unpacker<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Unpacker<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Bytes left unconsumed in the buffer.
    pub fn remaining(&self) -> usize {
        let pos = self.cursor.position() as usize;
        self.cursor.get_ref().len().saturating_sub(pos)
    }

    fn truncated<T>(what: &'static str, expected: usize) -> BoltResult<T> {
        Err(BoltError::Truncated { what, expected })
    }

    fn read_u8(&mut self) -> BoltResult<u8> {
        self.cursor
            .read_u8()
            .map_err(|_| BoltError::Truncated {
                what: "marker/length byte",
                expected: 1,
            })
    }

    /// Reads one raw byte without marker interpretation. Used by the message layer to read the
    /// structure header and tag byte, which are not `Value`s in their own right.
    pub(crate) fn read_raw_u8(&mut self) -> BoltResult<u8> {
        self.read_u8()
    }

    fn read_bytes(&mut self, n: usize) -> BoltResult<Vec<u8>> {
        let mut buf = vec![0_u8; n];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| BoltError::Truncated {
                what: "string bytes",
                expected: n,
            })?;
        Ok(buf)
    }

    /// Reads one `Value`, dispatching on a single marker byte.
    pub fn unpack(&mut self) -> BoltResult<Value> {
        let marker = self.read_u8()?;
        match marker {
            marker::NULL => Ok(Value::Null),

            // tiny positive integer: the marker byte is the literal value
            m if m <= marker::TINY_POSITIVE_INT_MAX => Ok(Value::Integer(i64::from(m))),
            // tiny negative integer: v - 0x100
            m if m >= marker::TINY_NEGATIVE_INT_MIN => Ok(Value::Integer(i64::from(m) - 0x100)),

            marker::INT_8 => Ok(Value::Integer(i64::from(
                self.cursor
                    .read_i8()
                    .map_err(|_| BoltError::Truncated { what: "i8", expected: 1 })?,
            ))),
            marker::INT_16 => Ok(Value::Integer(i64::from(
                self.cursor
                    .read_i16::<BigEndian>()
                    .map_err(|_| BoltError::Truncated { what: "i16", expected: 2 })?,
            ))),
            marker::INT_32 => Ok(Value::Integer(i64::from(
                self.cursor
                    .read_i32::<BigEndian>()
                    .map_err(|_| BoltError::Truncated { what: "i32", expected: 4 })?,
            ))),
            marker::INT_64 => Ok(Value::Integer(
                self.cursor
                    .read_i64::<BigEndian>()
                    .map_err(|_| BoltError::Truncated { what: "i64", expected: 8 })?,
            )),

            m if (marker::TINY_STRING..marker::TINY_STRING + 0x10).contains(&m) => {
                self.unpack_string((m & 0x0F) as usize)
            }
            marker::STRING_8 => {
                let len = self.read_u8()? as usize;
                self.unpack_string(len)
            }
            marker::STRING_16 => {
                let len = self.read_u16be()?;
                self.unpack_string(len)
            }
            marker::STRING_32 => {
                let len = self.read_u32be()?;
                self.unpack_string(len)
            }

            m if (marker::TINY_LIST..marker::TINY_LIST + 0x10).contains(&m) => {
                self.unpack_list((m & 0x0F) as usize)
            }
            marker::LIST_8 => {
                let len = self.read_u8()? as usize;
                self.unpack_list(len)
            }
            marker::LIST_16 => {
                let len = self.read_u16be()?;
                self.unpack_list(len)
            }
            marker::LIST_32 => {
                let len = self.read_u32be()?;
                self.unpack_list(len)
            }

            m if (marker::TINY_MAP..marker::TINY_MAP + 0x10).contains(&m) => {
                self.unpack_map((m & 0x0F) as usize)
            }
            marker::MAP_8 => {
                let len = self.read_u8()? as usize;
                self.unpack_map(len)
            }
            marker::MAP_16 => {
                let len = self.read_u16be()?;
                self.unpack_map(len)
            }
            marker::MAP_32 => {
                let len = self.read_u32be()?;
                self.unpack_map(len)
            }

            other => Err(BoltError::UnknownMarker { marker: other }),
        }
    }

    fn read_u16be(&mut self) -> BoltResult<usize> {
        self.cursor
            .read_u16::<BigEndian>()
            .map(usize::from)
            .map_err(|_| BoltError::Truncated {
                what: "u16 length",
                expected: 2,
            })
    }

    fn read_u32be(&mut self) -> BoltResult<usize> {
        self.cursor
            .read_u32::<BigEndian>()
            .map(|v| v as usize)
            .map_err(|_| BoltError::Truncated {
                what: "u32 length",
                expected: 4,
            })
    }

    fn unpack_string(&mut self, len: usize) -> BoltResult<Value> {
        if self.remaining() < len {
            return Self::truncated("string bytes", len);
        }
        let bytes = self.read_bytes(len)?;
        let s = String::from_utf8(bytes)?;
        Ok(Value::String(s))
    }

    fn unpack_list(&mut self, len: usize) -> BoltResult<Value> {
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(self.unpack()?);
        }
        Ok(Value::List(items))
    }

    fn unpack_map(&mut self, len: usize) -> BoltResult<Value> {
        let mut map = Map::new();
        for _ in 0..len {
            let key = match self.unpack()? {
                Value::String(s) => s,
                _ => return Err(BoltError::UnsupportedKey),
            };
            let value = self.unpack()?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}
