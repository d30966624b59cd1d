use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::fmt::Display;
use core::marker::PhantomData;
use core::str::FromStr;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::TypeInfo;
use crate::interfaces::{CodecError, DataSerializer};

// -----------------------------------------------------------------------------
// PrimitiveValue

/// A fixed size value with a binary form in either byte order.
pub trait PrimitiveValue:
    TypeInfo + Copy + PartialEq + Display + FromStr + Send + Sync
{
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Writes `self` into `buf`, which is exactly `SIZE` bytes long.
    fn encode<B: ByteOrder>(self, buf: &mut [u8]);

    /// Reads a value from exactly `SIZE` bytes.
    fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self>;
}

macro_rules! impl_primitive_value {
    ($($ty:ty => $size:literal, $read:ident, $write:ident;)*) => {$(
        impl PrimitiveValue for $ty {
            const SIZE: usize = $size;

            #[inline]
            fn encode<B: ByteOrder>(self, buf: &mut [u8]) {
                B::$write(buf, self);
            }

            #[inline]
            fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self> {
                Some(B::$read(buf))
            }
        }
    )*};
}

impl_primitive_value! {
    u16 => 2, read_u16, write_u16;
    u32 => 4, read_u32, write_u32;
    u64 => 8, read_u64, write_u64;
    i16 => 2, read_i16, write_i16;
    i32 => 4, read_i32, write_i32;
    i64 => 8, read_i64, write_i64;
    f32 => 4, read_f32, write_f32;
    f64 => 8, read_f64, write_f64;
}

impl PrimitiveValue for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode<B: ByteOrder>(self, buf: &mut [u8]) {
        buf[0] = self;
    }

    #[inline]
    fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self> {
        buf.first().copied()
    }
}

impl PrimitiveValue for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn encode<B: ByteOrder>(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }

    #[inline]
    fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self> {
        buf.first().map(|b| *b as i8)
    }
}

impl PrimitiveValue for bool {
    const SIZE: usize = 1;

    #[inline]
    fn encode<B: ByteOrder>(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }

    fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self> {
        match buf.first()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

impl PrimitiveValue for char {
    const SIZE: usize = 4;

    #[inline]
    fn encode<B: ByteOrder>(self, buf: &mut [u8]) {
        B::write_u32(buf, self as u32);
    }

    #[inline]
    fn decode<B: ByteOrder>(buf: &[u8]) -> Option<Self> {
        char::from_u32(B::read_u32(buf))
    }
}

/// Appends the encoded `value` in the requested byte order.
pub(crate) fn encode_value<T: PrimitiveValue>(value: T, out: &mut Vec<u8>, big_endian: bool) {
    let start = out.len();
    out.resize(start + T::SIZE, 0);
    let buf = &mut out[start..];
    if big_endian {
        value.encode::<BigEndian>(buf);
    } else {
        value.encode::<LittleEndian>(buf);
    }
}

/// Decodes a whole payload as `T`.
pub(crate) fn decode_value<T: PrimitiveValue>(data: &[u8], big_endian: bool) -> Result<T, CodecError> {
    if data.len() != T::SIZE {
        return Err(CodecError::UnexpectedSize {
            expected: T::SIZE,
            found: data.len(),
        });
    }
    let value = if big_endian {
        T::decode::<BigEndian>(data)
    } else {
        T::decode::<LittleEndian>(data)
    };
    value.ok_or(CodecError::InvalidData {
        expected: type_name::<T>(),
    })
}

/// Parses the text form of `T`.
pub(crate) fn parse_value<T: PrimitiveValue>(text: &str) -> Result<T, CodecError> {
    text.trim().parse::<T>().map_err(|_| CodecError::InvalidText {
        text: text.to_string(),
        expected: type_name::<T>(),
    })
}

#[inline]
fn wrong_type<T>() -> CodecError {
    CodecError::WrongType {
        expected: type_name::<T>(),
    }
}

// -----------------------------------------------------------------------------
// PrimitiveSerializer

/// Serializer of a [`PrimitiveValue`]. Text is the `Display` form.
pub struct PrimitiveSerializer<T>(PhantomData<fn() -> T>);

impl<T> PrimitiveSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PrimitiveSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PrimitiveValue> DataSerializer for PrimitiveSerializer<T> {
    fn save(&self, value: &dyn Any, out: &mut Vec<u8>, big_endian: bool) -> Result<(), CodecError> {
        let value = value.downcast_ref::<T>().ok_or_else(wrong_type::<T>)?;
        encode_value(*value, out, big_endian);
        Ok(())
    }

    fn load(
        &self,
        value: &mut dyn Any,
        data: &[u8],
        _version: u32,
        big_endian: bool,
    ) -> Result<(), CodecError> {
        let value = value.downcast_mut::<T>().ok_or_else(wrong_type::<T>)?;
        *value = decode_value(data, big_endian)?;
        Ok(())
    }

    fn data_to_text(&self, data: &[u8], big_endian: bool) -> Result<String, CodecError> {
        decode_value::<T>(data, big_endian).map(|value| value.to_string())
    }

    fn text_to_data(
        &self,
        text: &str,
        _text_version: u32,
        big_endian: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(T::SIZE);
        encode_value(parse_value::<T>(text)?, &mut out, big_endian);
        Ok(out)
    }

    fn compare_value_data(&self, lhs: &dyn Any, rhs: &dyn Any) -> bool {
        match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<T>()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// StringSerializer

/// Serializer of `String`: raw UTF-8 in binary form, the string itself as
/// text.
#[derive(Default)]
pub struct StringSerializer;

impl DataSerializer for StringSerializer {
    fn save(&self, value: &dyn Any, out: &mut Vec<u8>, _big_endian: bool) -> Result<(), CodecError> {
        let value = value.downcast_ref::<String>().ok_or_else(wrong_type::<String>)?;
        out.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn load(
        &self,
        value: &mut dyn Any,
        data: &[u8],
        _version: u32,
        _big_endian: bool,
    ) -> Result<(), CodecError> {
        let value = value.downcast_mut::<String>().ok_or_else(wrong_type::<String>)?;
        let text = core::str::from_utf8(data).map_err(|_| CodecError::InvalidUtf8)?;
        value.clear();
        value.push_str(text);
        Ok(())
    }

    fn data_to_text(&self, data: &[u8], _big_endian: bool) -> Result<String, CodecError> {
        core::str::from_utf8(data)
            .map(ToString::to_string)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    fn text_to_data(
        &self,
        text: &str,
        _text_version: u32,
        _big_endian: bool,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(text.as_bytes().to_vec())
    }

    fn compare_value_data(&self, lhs: &dyn Any, rhs: &dyn Any) -> bool {
        match (lhs.downcast_ref::<String>(), rhs.downcast_ref::<String>()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Type ids

crate::impl_type_info!(bool, "bool", 0xa0ca880c_afe4_43cb_926c_59ac48496112);
crate::impl_type_info!(char, "char", 0x3ab0037f_af8d_48ce_bca0_a170d18b2c03);
crate::impl_type_info!(i8, "i8", 0x58422c0e_1e47_4854_98e6_34098f6fe12d);
crate::impl_type_info!(i16, "i16", 0xb8a56d56_a10d_4dce_9f63_405ee243dd3c);
crate::impl_type_info!(i32, "i32", 0x72039442_eb38_4d42_a1ad_cb68f7e0eef6);
crate::impl_type_info!(i64, "i64", 0x70d8a282_a1ea_462d_9d04_51ede81fac2f);
crate::impl_type_info!(u8, "u8", 0x72b9409a_7d1a_4831_9cfe_fcb3fadd3426);
crate::impl_type_info!(u16, "u16", 0xeca0b403_c4f8_4b86_95fc_81688d046e40);
crate::impl_type_info!(u32, "u32", 0x43da906b_7def_4ca8_9790_854106d3f983);
crate::impl_type_info!(u64, "u64", 0xd6597933_47cd_4fc8_b911_63f3e2b0993a);
crate::impl_type_info!(f32, "f32", 0xea2c3e90_afbe_44d4_a90d_faaf79baf93d);
crate::impl_type_info!(f64, "f64", 0x110c4b14_11a8_4e9d_8638_5051013a56ac);
crate::impl_type_info!(String, "String", 0x03aaab3f_5c47_5a66_9ebc_d5fa4db353c9);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn byte_order() {
        let ser = PrimitiveSerializer::<u32>::new();
        let mut le = Vec::new();
        let mut be = Vec::new();
        ser.save(&0x0102_0304_u32, &mut le, false).unwrap();
        ser.save(&0x0102_0304_u32, &mut be, true).unwrap();
        assert_eq!(le, [4, 3, 2, 1]);
        assert_eq!(be, [1, 2, 3, 4]);

        let mut out = 0_u32;
        ser.load(&mut out, &be, 0, true).unwrap();
        assert_eq!(out, 0x0102_0304);
    }

    #[test]
    fn text_round_trip() {
        let ser = PrimitiveSerializer::<f64>::new();
        let data = ser.text_to_data(" 0.1 ", 0, false).unwrap();
        assert_eq!(ser.data_to_text(&data, false).unwrap(), "0.1");

        let ser = PrimitiveSerializer::<bool>::new();
        let data = ser.text_to_data("true", 0, true).unwrap();
        assert_eq!(data, [1]);
        assert_eq!(ser.data_to_text(&data, true).unwrap(), "true");

        let ser = PrimitiveSerializer::<char>::new();
        let data = ser.text_to_data("é", 0, false).unwrap();
        assert_eq!(ser.data_to_text(&data, false).unwrap(), "é");
    }

    #[test]
    fn rejects_bad_input() {
        let ser = PrimitiveSerializer::<i16>::new();
        let mut value = 0_i16;
        assert_eq!(
            ser.load(&mut value, &[1, 2, 3], 0, false),
            Err(CodecError::UnexpectedSize { expected: 2, found: 3 })
        );
        assert!(matches!(ser.text_to_data("x", 0, false), Err(CodecError::InvalidText { .. })));
        assert!(matches!(ser.save(&1_u8, &mut Vec::new(), false), Err(CodecError::WrongType { .. })));

        let ser = PrimitiveSerializer::<bool>::new();
        let mut flag = false;
        assert!(matches!(ser.load(&mut flag, &[7], 0, false), Err(CodecError::InvalidData { .. })));
    }

    #[test]
    fn string() {
        let ser = StringSerializer;
        let mut data = Vec::new();
        ser.save(&String::from("hello"), &mut data, true).unwrap();
        assert_eq!(data, b"hello");

        let mut out = String::from("old");
        ser.load(&mut out, &data, 0, false).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(ser.load(&mut out, &[0xff], 0, false), Err(CodecError::InvalidUtf8));
        assert!(ser.compare_value_data(&out, &String::from("hello")));
    }
}
