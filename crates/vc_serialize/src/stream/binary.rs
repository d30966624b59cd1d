//! Binary layout:
//!
//! ```text
//! stream  := "VCOB" version:u8 flags:u8 node
//! node    := name_len:u32 name id:[u8; 16] version:u32 data_type:u8
//!            data_len:u32 data child_count:u32 node*
//! ```
//!
//! Integers use the byte order selected by bit 0 of `flags`; ids are
//! stored as big endian bytes. Payload bytes are copied as is, their
//! encoding is the node's `data_type`.

use alloc::string::String;
use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::info::TypeUuid;
use crate::stream::StreamError;
use crate::tree::{DataElement, DataElementNode, DataType};

pub(crate) const MAGIC: &[u8; 4] = b"VCOB";
pub(crate) const VERSION: u8 = 1;
const FLAG_BIG_ENDIAN: u8 = 1;
/// Deepest node nesting accepted when reading.
pub(crate) const MAX_DEPTH: usize = 128;

// -----------------------------------------------------------------------------
// Write

pub(crate) fn write_stream(root: &DataElementNode, big_endian: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    if big_endian {
        out.push(FLAG_BIG_ENDIAN);
        write_node::<BigEndian>(root, &mut out);
    } else {
        out.push(0);
        write_node::<LittleEndian>(root, &mut out);
    }
    out
}

fn write_u32<B: ByteOrder>(value: u32, out: &mut Vec<u8>) {
    let mut buf = [0; 4];
    B::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn write_node<B: ByteOrder>(node: &DataElementNode, out: &mut Vec<u8>) {
    let element = node.element();
    write_u32::<B>(element.name().len() as u32, out);
    out.extend_from_slice(element.name().as_bytes());
    out.extend_from_slice(element.id().as_bytes());
    write_u32::<B>(element.version(), out);
    out.push(match element.data_type() {
        DataType::Text => 0,
        DataType::Binary => 1,
        DataType::BinaryBe => 2,
    });
    write_u32::<B>(element.buffer().len() as u32, out);
    out.extend_from_slice(element.buffer());
    write_u32::<B>(node.num_sub_elements() as u32, out);
    for child in node.children() {
        write_node::<B>(child, out);
    }
}

// -----------------------------------------------------------------------------
// Read

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], StreamError> {
        if self.data.len() < len {
            return Err(StreamError::UnexpectedEof);
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.take(1)?[0])
    }

    fn u32<B: ByteOrder>(&mut self) -> Result<u32, StreamError> {
        Ok(B::read_u32(self.take(4)?))
    }

    fn len<B: ByteOrder>(&mut self) -> Result<usize, StreamError> {
        let len = self.u32::<B>()? as usize;
        // A length past the end is corrupt; fail before allocating.
        if len > self.data.len() {
            return Err(StreamError::UnexpectedEof);
        }
        Ok(len)
    }
}

pub(crate) fn read_stream(data: &[u8]) -> Result<DataElementNode, StreamError> {
    let mut reader = Reader { data };
    if reader.take(4).map_err(|_| StreamError::BadMagic)? != MAGIC {
        return Err(StreamError::BadMagic);
    }
    let version = reader.u8()?;
    if version != VERSION {
        return Err(StreamError::UnsupportedVersion(version));
    }
    let root = if reader.u8()? & FLAG_BIG_ENDIAN != 0 {
        read_node::<BigEndian>(&mut reader, 0)?
    } else {
        read_node::<LittleEndian>(&mut reader, 0)?
    };
    match reader.data.len() {
        0 => Ok(root),
        trailing => Err(StreamError::TrailingData(trailing)),
    }
}

fn read_node<B: ByteOrder>(reader: &mut Reader<'_>, depth: usize) -> Result<DataElementNode, StreamError> {
    if depth >= MAX_DEPTH {
        return Err(StreamError::TooDeep(MAX_DEPTH));
    }
    let name_len = reader.len::<B>()?;
    let name = core::str::from_utf8(reader.take(name_len)?).map_err(|_| StreamError::InvalidName)?;
    let mut id = [0; 16];
    id.copy_from_slice(reader.take(16)?);
    let version = reader.u32::<B>()?;
    let data_type = match reader.u8()? {
        0 => DataType::Text,
        1 => DataType::Binary,
        2 => DataType::BinaryBe,
        other => return Err(StreamError::InvalidDataType(other)),
    };
    let data_len = reader.len::<B>()?;
    let buffer = reader.take(data_len)?.to_vec();

    let mut element = DataElement::new(String::from(name), TypeUuid::from_bytes(id), version);
    element.set_buffer(data_type, buffer);
    let mut node = DataElementNode::from_element(element);

    let count = reader.u32::<B>()?;
    for _ in 0..count {
        node.add_element_node(read_node::<B>(reader, depth + 1)?);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataElementNode {
        let mut root = DataElementNode::from_element(DataElement::new("root", TypeUuid::from_u128(7), 2));
        let mut leaf = DataElement::new("leaf", TypeUuid::from_u128(9), 0);
        leaf.set_buffer(DataType::BinaryBe, alloc::vec![1, 2, 3]);
        root.add_element_node(DataElementNode::from_element(leaf));
        root
    }

    #[test]
    fn layout() {
        let data = write_stream(&sample(), false);
        assert_eq!(&data[..6], b"VCOB\x01\x00");
        assert_eq!(&data[6..10], [4, 0, 0, 0]);
        assert_eq!(&data[10..14], b"root");
        assert_eq!(read_stream(&data).unwrap(), sample());

        let data = write_stream(&sample(), true);
        assert_eq!(&data[6..10], [0, 0, 0, 4]);
        assert_eq!(read_stream(&data).unwrap(), sample());
    }

    #[test]
    fn corrupt_streams() {
        let data = write_stream(&sample(), false);
        assert!(matches!(read_stream(b"XXXX\x01\x00"), Err(StreamError::BadMagic)));
        assert!(matches!(read_stream(b"VC"), Err(StreamError::BadMagic)));
        assert!(matches!(read_stream(b"VCOB\x09\x00"), Err(StreamError::UnsupportedVersion(9))));
        assert!(matches!(read_stream(&data[..data.len() - 1]), Err(StreamError::UnexpectedEof)));

        let mut long = data.clone();
        long.push(0);
        assert!(matches!(read_stream(&long), Err(StreamError::TrailingData(1))));
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |depth: usize| {
            let mut node = DataElementNode::new("");
            for _ in 1..depth {
                let mut parent = DataElementNode::new("");
                parent.add_element_node(node);
                node = parent;
            }
            write_stream(&node, false)
        };
        assert!(read_stream(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(read_stream(&nested(MAX_DEPTH + 1)), Err(StreamError::TooDeep(_))));

        // Far deeper than the limit, with every node but the last truncated.
        let mut data = b"VCOB\x01\x00".to_vec();
        for _ in 0..20_000 {
            data.extend_from_slice(&[0; 4]);
            data.extend_from_slice(&[0; 16]);
            data.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0]);
        }
        assert!(matches!(read_stream(&data), Err(StreamError::TooDeep(_))));
    }
}
