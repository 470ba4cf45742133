//! The `PackStream` marker table (§4.B). Exhaustive for the value domain this core supports:
//! null, integers, UTF-8 strings, lists, and string-keyed maps.

pub const NULL: u8 = 0xC0;

pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

pub const TINY_POSITIVE_INT_MAX: u8 = 0x7F;
pub const TINY_NEGATIVE_INT_MIN: u8 = 0xF0;

pub const TINY_STRING: u8 = 0x80; // 0x80..=0x8F, low nibble = length
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

pub const TINY_LIST: u8 = 0x90; // 0x90..=0x9F, low nibble = length
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

pub const TINY_MAP: u8 = 0xA0; // 0xA0..=0xAF, low nibble = length
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

pub const STRUCTURE: u8 = 0xB0; // 0xB0..=0xBF, low nibble = field count
pub const STRUCTURE_MAX_FIELDS: u8 = 0x0F;
