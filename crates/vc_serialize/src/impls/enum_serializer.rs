use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::impls::primitives::{decode_value, encode_value, parse_value};
use crate::impls::PrimitiveValue;
use crate::interfaces::{CodecError, DataSerializer};

// -----------------------------------------------------------------------------
// EnumSerializer

/// Serializer of a C-like enum stored as its underlying integer `U`.
///
/// The text form is the declared name of the value. Integers that match a
/// declared value are accepted as text too.
pub struct EnumSerializer<E, U> {
    values: Vec<(Cow<'static, str>, E)>,
    to_underlying: fn(E) -> U,
}

impl<E: Copy, U: PrimitiveValue> EnumSerializer<E, U> {
    #[inline]
    pub fn new(values: Vec<(Cow<'static, str>, E)>, to_underlying: fn(E) -> U) -> Self {
        Self {
            values,
            to_underlying,
        }
    }

    fn by_underlying(&self, raw: U) -> Option<&(Cow<'static, str>, E)> {
        self.values
            .iter()
            .find(|(_, value)| (self.to_underlying)(*value) == raw)
    }

    fn unknown(raw: U) -> CodecError {
        CodecError::UnknownEnumValue(raw.to_string())
    }
}

impl<E, U> DataSerializer for EnumSerializer<E, U>
where
    E: Copy + PartialEq + Any + Send + Sync,
    U: PrimitiveValue,
{
    fn save(&self, value: &dyn Any, out: &mut Vec<u8>, big_endian: bool) -> Result<(), CodecError> {
        let value = value.downcast_ref::<E>().ok_or(CodecError::WrongType {
            expected: type_name::<E>(),
        })?;
        encode_value((self.to_underlying)(*value), out, big_endian);
        Ok(())
    }

    fn load(
        &self,
        value: &mut dyn Any,
        data: &[u8],
        _version: u32,
        big_endian: bool,
    ) -> Result<(), CodecError> {
        let value = value.downcast_mut::<E>().ok_or(CodecError::WrongType {
            expected: type_name::<E>(),
        })?;
        let raw = decode_value::<U>(data, big_endian)?;
        let (_, decoded) = self.by_underlying(raw).ok_or_else(|| Self::unknown(raw))?;
        *value = *decoded;
        Ok(())
    }

    fn data_to_text(&self, data: &[u8], big_endian: bool) -> Result<String, CodecError> {
        let raw = decode_value::<U>(data, big_endian)?;
        Ok(match self.by_underlying(raw) {
            Some((name, _)) => name.to_string(),
            None => raw.to_string(),
        })
    }

    fn text_to_data(
        &self,
        text: &str,
        _text_version: u32,
        big_endian: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let text = text.trim();
        let raw = match self.values.iter().find(|(name, _)| name == text) {
            Some((_, value)) => (self.to_underlying)(*value),
            None => parse_value::<U>(text)?,
        };
        if self.by_underlying(raw).is_none() {
            return Err(Self::unknown(raw));
        }
        let mut out = Vec::with_capacity(U::SIZE);
        encode_value(raw, &mut out, big_endian);
        Ok(out)
    }

    fn compare_value_data(&self, lhs: &dyn Any, rhs: &dyn Any) -> bool {
        match (lhs.downcast_ref::<E>(), rhs.downcast_ref::<E>()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EnumSerializer;
    use crate::interfaces::{CodecError, DataSerializer};
    use alloc::borrow::Cow;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Mode {
        Off = 0,
        On = 7,
    }

    fn serializer() -> EnumSerializer<Mode, u8> {
        EnumSerializer::new(
            vec![(Cow::Borrowed("Off"), Mode::Off), (Cow::Borrowed("On"), Mode::On)],
            |m| m as u8,
        )
    }

    #[test]
    fn binary_and_text() {
        let ser = serializer();
        let mut data = Vec::new();
        ser.save(&Mode::On, &mut data, false).unwrap();
        assert_eq!(data, [7]);
        assert_eq!(ser.data_to_text(&data, false).unwrap(), "On");
        assert_eq!(ser.text_to_data("Off", 0, false).unwrap(), [0]);
        assert_eq!(ser.text_to_data("7", 0, false).unwrap(), [7]);

        let mut mode = Mode::Off;
        ser.load(&mut mode, &[7], 0, false).unwrap();
        assert_eq!(mode, Mode::On);
    }

    #[test]
    fn unknown_values() {
        let ser = serializer();
        let mut mode = Mode::Off;
        assert_eq!(
            ser.load(&mut mode, &[3], 0, false),
            Err(CodecError::UnknownEnumValue("3".into()))
        );
        assert!(ser.text_to_data("Maybe", 0, false).is_err());
        assert_eq!(mode, Mode::Off);
    }
}
