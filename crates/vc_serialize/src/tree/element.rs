use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::info::{TypeUuid, name_crc};

/// Encoding of a [`DataElement`] payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// UTF-8 text, produced by the serializer's text form.
    Text,
    /// Little endian binary.
    #[default]
    Binary,
    /// Big endian binary.
    BinaryBe,
}

impl DataType {
    #[inline]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Text)
    }

    #[inline]
    pub const fn is_big_endian(self) -> bool {
        matches!(self, Self::BinaryBe)
    }
}

/// The serialized data of one node.
///
/// `id` names the class the data was written from. The payload is only
/// set for leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataElement {
    pub(crate) name: Cow<'static, str>,
    pub(crate) name_crc: u32,
    pub(crate) id: TypeUuid,
    pub(crate) version: u32,
    pub(crate) data_type: DataType,
    pub(crate) buffer: Vec<u8>,
}

impl DataElement {
    pub fn new(name: impl Into<Cow<'static, str>>, id: TypeUuid, version: u32) -> Self {
        let name = name.into();
        Self {
            name_crc: name_crc(&name),
            name,
            id,
            version,
            data_type: DataType::Binary,
            buffer: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn name_crc(&self) -> u32 {
        self.name_crc
    }

    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.name = name.into();
        self.name_crc = name_crc(&self.name);
    }

    #[inline]
    pub fn id(&self) -> TypeUuid {
        self.id
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Replaces the payload.
    pub fn set_buffer(&mut self, data_type: DataType, buffer: Vec<u8>) {
        self.data_type = data_type;
        self.buffer = buffer;
    }
}
