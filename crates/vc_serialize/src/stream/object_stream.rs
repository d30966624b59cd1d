use alloc::vec::Vec;
use core::any::Any;

use crate::enumerate::{EnumerateFlags, ErrorHandler, InstanceVisitorMut};
use crate::info::{TypeInfo, TypeUuid};
use crate::stream::{StreamError, binary, text};
use crate::tree::{DataElementNode, DataError, DataType, SetDataOutcome};
use crate::{ClassData, ClassElement, SerializeContext};

/// Encoding of an object stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    /// Compact binary nodes with binary payloads.
    Binary { big_endian: bool },
    /// JSON nodes with text payloads.
    Text { pretty: bool },
}

impl Default for StreamFormat {
    #[inline]
    fn default() -> Self {
        Self::Binary { big_endian: false }
    }
}

impl StreamFormat {
    /// Payload encoding used for leaves saved in this format.
    #[inline]
    pub const fn data_type(self) -> DataType {
        match self {
            Self::Binary { big_endian: false } => DataType::Binary,
            Self::Binary { big_endian: true } => DataType::BinaryBe,
            Self::Text { .. } => DataType::Text,
        }
    }
}

struct LoadedNotifier;

impl InstanceVisitorMut for LoadedNotifier {
    fn begin(&mut self, instance: &mut dyn Any, class: &ClassData, _: Option<&ClassElement>) -> bool {
        if let Some(handler) = class.event_handler() {
            handler.on_loaded_from_object_stream(instance);
        }
        true
    }
}

/// Saves objects to and loads objects from bytes.
///
/// Saving builds a data tree with
/// [`DataElementNode::set_data_any`] and encodes it in the stream format.
/// Loading decodes the tree, upgrades it to the registered versions,
/// fills the target object and then calls
/// [`on_loaded_from_object_stream`] on every loaded object.
///
/// Both formats are accepted when loading, whatever the format of the
/// stream object.
///
/// [`on_loaded_from_object_stream`]: crate::interfaces::EventHandler::on_loaded_from_object_stream
pub struct ObjectStream<'a> {
    sc: &'a SerializeContext,
    format: StreamFormat,
}

impl<'a> ObjectStream<'a> {
    #[inline]
    pub const fn new(sc: &'a SerializeContext, format: StreamFormat) -> Self {
        Self { sc, format }
    }

    #[inline]
    pub const fn format(&self) -> StreamFormat {
        self.format
    }

    // -------------------------------------------------------------------------
    // Nodes

    /// Encodes a data tree.
    pub fn write_node(&self, node: &DataElementNode) -> Result<Vec<u8>, StreamError> {
        match self.format {
            StreamFormat::Binary { big_endian } => Ok(binary::write_stream(node, big_endian)),
            StreamFormat::Text { pretty } => text::write_stream(self.sc, node, pretty),
        }
    }

    /// Decodes a data tree. The format is detected from the data.
    pub fn read_node(&self, data: &[u8]) -> Result<DataElementNode, StreamError> {
        if data.starts_with(binary::MAGIC) {
            return binary::read_stream(data);
        }
        match data.iter().find(|byte| !byte.is_ascii_whitespace()) {
            Some(b'{') => text::read_stream(data),
            _ => Err(StreamError::BadMagic),
        }
    }

    // -------------------------------------------------------------------------
    // Objects

    #[inline]
    pub fn save_object<T: TypeInfo>(&self, value: &T) -> Result<Vec<u8>, StreamError> {
        self.save_object_any(value, T::type_uuid())
    }

    /// Encodes `value`, an instance of class `uuid`.
    pub fn save_object_any(&self, value: &dyn Any, uuid: TypeUuid) -> Result<Vec<u8>, StreamError> {
        let mut node = DataElementNode::new("");
        let mut errors = ErrorHandler::new();
        match node.set_data_any(self.sc, value, uuid, self.format.data_type(), &mut errors)? {
            SetDataOutcome::Written => self.write_node(&node),
            SetDataOutcome::Skipped => Err(StreamError::Skipped),
        }
    }

    #[inline]
    pub fn load_object<T: TypeInfo + Default>(&self, data: &[u8]) -> Result<T, StreamError> {
        let mut value = T::default();
        self.load_object_into(data, &mut value, T::type_uuid())?;
        Ok(value)
    }

    /// Loads a stream into `out`, an instance of class `uuid`.
    ///
    /// Errors within the tree skip the faulty element and are collected;
    /// loading goes on, and the call then fails with
    /// [`StreamError::Reported`].
    pub fn load_object_into(&self, data: &[u8], out: &mut dyn Any, uuid: TypeUuid) -> Result<(), StreamError> {
        let mut node = self.read_node(data)?;
        let mut errors = ErrorHandler::new();
        if !self.sc.upgrade_node(&mut node, &mut errors) {
            return Err(StreamError::Dropped);
        }

        match node.get_data_any(self.sc, out, uuid, &mut errors) {
            Ok(()) | Err(DataError::Reported { .. }) => {}
            Err(error) => return Err(error.into()),
        }
        self.sc
            .enumerate_instance(out, uuid, &mut LoadedNotifier, EnumerateFlags::empty(), &mut errors);

        match errors.error_count() {
            0 => Ok(()),
            count => {
                log::warn!("object stream loaded with {count} errors");
                Err(StreamError::Reported { count })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::test_types::{Base, Derived, Holder, Shape, Tagged, reflect_all};

    fn context() -> SerializeContext {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);
        sc
    }

    fn derived() -> Derived {
        Derived {
            base: Base { x: -3 },
            y: 7,
            shape: Shape::Sphere,
            values: vec![1, 2, 3],
        }
    }

    #[test]
    fn formats_round_trip() {
        let sc = context();
        for format in [
            StreamFormat::Binary { big_endian: false },
            StreamFormat::Binary { big_endian: true },
            StreamFormat::Text { pretty: false },
            StreamFormat::Text { pretty: true },
        ] {
            let stream = ObjectStream::new(&sc, format);
            let data = stream.save_object(&derived()).unwrap();
            let loaded: Derived = stream.load_object(&data).unwrap();
            assert_eq!(loaded, derived(), "{format:?}");
        }
    }

    #[test]
    fn any_format_loads() {
        let sc = context();
        let text = ObjectStream::new(&sc, StreamFormat::Text { pretty: false });
        let binary = ObjectStream::new(&sc, StreamFormat::default());

        let data = text.save_object(&derived()).unwrap();
        assert_eq!(binary.load_object::<Derived>(&data).unwrap(), derived());
        let data = binary.save_object(&derived()).unwrap();
        assert_eq!(text.load_object::<Derived>(&data).unwrap(), derived());
    }

    #[test]
    fn pointers_and_maps() {
        let sc = context();
        let mut names = BTreeMap::new();
        names.insert(1, String::from("one"));
        let holder = Holder {
            boxed: Some(alloc::boxed::Box::new(Base { x: 5 })),
            names,
            ..Default::default()
        };

        let stream = ObjectStream::new(&sc, StreamFormat::Text { pretty: false });
        let data = stream.save_object(&holder).unwrap();
        let loaded: Holder = stream.load_object(&data).unwrap();
        assert_eq!(loaded.boxed.as_deref(), Some(&Base { x: 5 }));
        assert_eq!(loaded.names.get(&1).map(String::as_str), Some("one"));
        assert!(loaded.empty.is_none());
    }

    #[test]
    fn loaded_hook_fires() {
        let sc = context();
        let stream = ObjectStream::new(&sc, StreamFormat::default());
        let data = stream.save_object(&Tagged { value: 1, cloned: 0 }).unwrap();
        let loaded: Tagged = stream.load_object(&data).unwrap();
        assert_eq!(loaded.value, 1001);
    }

    #[test]
    fn wrong_root_type() {
        let sc = context();
        let stream = ObjectStream::new(&sc, StreamFormat::default());
        let data = stream.save_object(&Base { x: 1 }).unwrap();
        assert!(matches!(
            stream.load_object::<Derived>(&data),
            Err(StreamError::Data(DataError::TypeMismatch { .. }))
        ));
        assert!(matches!(stream.load_object::<Base>(b"nope"), Err(StreamError::BadMagic)));
    }
}
