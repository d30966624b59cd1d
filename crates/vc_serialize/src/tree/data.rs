use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::Any;
use core::mem;

use crate::enumerate::{EnumerateFlags, ErrorHandler, InstanceVisitor, stack_entry};
use crate::info::{TypeInfo, TypeUuid};
use crate::interfaces::{CodecError, DataSerializer};
use crate::tree::{DataElement, DataElementNode, DataError, DataType};
use crate::{ClassData, ClassElement, SerializeContext};

/// Result of a successful [`DataElementNode::set_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetDataOutcome {
    /// The node now holds the value.
    Written,
    /// The value's class declined to save it; the node is unchanged.
    Skipped,
}

// -----------------------------------------------------------------------------
// Write

/// Builds nodes from an instance walk. Each visited object gets a node;
/// skipped objects get a `None` placeholder so `end` stays balanced.
struct NodeWriter {
    data_type: DataType,
    stack: Vec<Option<DataElementNode>>,
    root: Option<DataElementNode>,
    failure: Option<DataError>,
}

impl NodeWriter {
    fn encode(&mut self, serializer: &dyn DataSerializer, instance: &dyn Any, class: &ClassData) -> Option<Vec<u8>> {
        let mut data = Vec::new();
        let encoded = match self.data_type {
            DataType::Text => serializer
                .save(instance, &mut data, false)
                .and_then(|()| serializer.data_to_text(&data, false))
                .map(|text| text.into_bytes()),
            data_type => serializer
                .save(instance, &mut data, data_type.is_big_endian())
                .map(|()| data),
        };
        encoded
            .map_err(|source| {
                let class = class.name().to_string();
                self.failure.get_or_insert(DataError::Codec { class, source });
            })
            .ok()
    }
}

impl InstanceVisitor for NodeWriter {
    fn begin(&mut self, instance: &dyn Any, class: &ClassData, element: Option<&ClassElement>) -> bool {
        if !class.should_save(instance) {
            self.stack.push(None);
            return false;
        }

        let name = element.map_or(Default::default(), |element| element.name.clone());
        let mut node = DataElementNode::from_element(DataElement::new(name, class.type_uuid(), class.version()));
        node.element.data_type = self.data_type;
        if let Some(serializer) = class.serializer() {
            let Some(buffer) = self.encode(serializer, instance, class) else {
                self.stack.push(None);
                return false;
            };
            node.element.buffer = buffer;
        }
        self.stack.push(Some(node));
        true
    }

    fn end(&mut self) -> bool {
        let Some(Some(node)) = self.stack.pop() else {
            return true;
        };
        match self.stack.last_mut() {
            Some(Some(parent)) => parent.children.push(node),
            Some(None) => {}
            None => self.root = Some(node),
        }
        true
    }
}

impl DataElementNode {
    /// Stores `value` in this node as binary data, replacing its content.
    #[inline]
    pub fn set_data<T: TypeInfo>(&mut self, sc: &SerializeContext, value: &T) -> Result<SetDataOutcome, DataError> {
        let mut errors = ErrorHandler::new();
        self.set_data_any(sc, value, T::type_uuid(), DataType::Binary, &mut errors)
    }

    /// Stores `value`, an instance of class `uuid`, with leaf payloads
    /// encoded as `data_type`.
    ///
    /// The node keeps its name. Its id and version become those of the
    /// class. A class whose `do_save` declines the value leaves the node
    /// untouched and returns [`SetDataOutcome::Skipped`]. Any error reported
    /// during the walk fails the call, and the node is left untouched.
    pub fn set_data_any(
        &mut self,
        sc: &SerializeContext,
        value: &dyn Any,
        uuid: TypeUuid,
        data_type: DataType,
        errors: &mut ErrorHandler,
    ) -> Result<SetDataOutcome, DataError> {
        let class = sc
            .find_class_data(uuid, None, 0)
            .ok_or(DataError::UnregisteredType { uuid })?;
        if !class.should_save(value) {
            return Ok(SetDataOutcome::Skipped);
        }

        let mut writer = NodeWriter {
            data_type,
            stack: Vec::new(),
            root: None,
            failure: None,
        };
        let before = errors.error_count();
        sc.enumerate_instance_const(value, uuid, &mut writer, EnumerateFlags::FOR_READ, errors);

        if let Some(failure) = writer.failure {
            errors.report_error(&failure.to_string());
            return Err(failure);
        }
        if errors.error_count() != before {
            return Err(DataError::Reported {
                count: errors.error_count() - before,
            });
        }
        let root = writer.root.ok_or(DataError::UnregisteredType { uuid })?;

        let name = mem::take(&mut self.element.name);
        *self = root;
        self.set_name(name);
        Ok(SetDataOutcome::Written)
    }
}

// -----------------------------------------------------------------------------
// Read

impl DataElementNode {
    /// Loads this node into `out`.
    ///
    /// The node must hold a `T`, the underlying type of enum `T`, or an
    /// instantiation the generic class `T` accepts. Text payloads are
    /// converted to binary in place.
    #[inline]
    pub fn get_data<T: TypeInfo>(&mut self, sc: &SerializeContext, out: &mut T) -> Result<(), DataError> {
        let mut errors = ErrorHandler::new();
        self.get_data_any(sc, out, T::type_uuid(), &mut errors)
    }

    /// Loads this node into `out`, an instance of class `uuid`.
    ///
    /// A type mismatch fails before `out` is touched. Errors within the
    /// tree are reported to `errors` and skip the faulty element; the call
    /// then fails with [`DataError::Reported`].
    pub fn get_data_any(
        &mut self,
        sc: &SerializeContext,
        out: &mut dyn Any,
        uuid: TypeUuid,
        errors: &mut ErrorHandler,
    ) -> Result<(), DataError> {
        let stored = self.type_uuid();
        if !sc.can_load_as(stored, uuid) {
            let error = DataError::TypeMismatch {
                expected: uuid,
                found: stored,
            };
            errors.report_error(&error.to_string());
            return Err(error);
        }
        let class = sc
            .find_class_data(uuid, None, 0)
            .ok_or(DataError::UnregisteredType { uuid })?;

        let before = errors.error_count();
        self.load_into(sc, out, class, None, errors);
        match errors.error_count() - before {
            0 => Ok(()),
            count => Err(DataError::Reported { count }),
        }
    }

    fn load_into(
        &mut self,
        sc: &SerializeContext,
        target: &mut dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
        errors: &mut ErrorHandler,
    ) {
        errors.push(stack_entry(class, element));
        let handler = class.event_handler();
        if let Some(handler) = handler {
            handler.on_write_begin(target);
        }

        if let Some(serializer) = class.serializer() {
            self.load_leaf(serializer, target, class, errors);
        } else if let Some(container) = class.container() {
            container.clear_elements(target);
            for child in &mut self.children {
                let Some(child_element) = container.element(child.name_crc()) else {
                    errors.report_error(&format!("`{}` is not an element of `{}`", child.name(), class.name()));
                    continue;
                };
                let child_class = match sc.stored_class(child.type_uuid(), class, child_element) {
                    Ok(child_class) => child_class,
                    Err(error) => {
                        errors.report_error(&error.to_string());
                        continue;
                    }
                };
                let Some(mut reserved) = container.reserve_element(target, child_element) else {
                    errors.report_error(&format!("Container `{}` is full", class.name()));
                    break;
                };
                child.load_into(sc, reserved.as_mut(), child_class, Some(child_element), errors);
                if let Err(rejected) = container.store_element(target, reserved) {
                    container.free_reserved_element(target, rejected);
                    errors.report_error(&format!("Container `{}` rejected an element", class.name()));
                }
            }
            container.elements_updated(target);
        } else {
            for child in &mut self.children {
                child.load_field(sc, target, class, errors);
            }
        }

        if let Some(handler) = handler {
            handler.on_write_end(target);
        }
        errors.pop();
    }

    fn load_leaf(
        &mut self,
        serializer: &dyn DataSerializer,
        target: &mut dyn Any,
        class: &ClassData,
        errors: &mut ErrorHandler,
    ) {
        if self.element.data_type == DataType::Text {
            let converted = core::str::from_utf8(&self.element.buffer)
                .map_err(|_| CodecError::InvalidUtf8)
                .and_then(|text| serializer.text_to_data(text, self.element.version, false));
            match converted {
                Ok(data) => self.element.set_buffer(DataType::Binary, data),
                Err(error) => {
                    errors.report_error(&format!("`{}`: {error}", class.name()));
                    return;
                }
            }
        }

        if self.element.buffer.is_empty() && class.serializes_no_data() {
            return;
        }
        let big_endian = self.element.data_type.is_big_endian();
        if let Err(error) = serializer.load(target, &self.element.buffer, self.element.version, big_endian) {
            errors.report_error(&format!("`{}`: {error}", class.name()));
        }
    }

    /// Loads a child of a composite into the field it names. Children
    /// that no longer match a field are ignored.
    fn load_field(&mut self, sc: &SerializeContext, target: &mut dyn Any, class: &ClassData, errors: &mut ErrorHandler) {
        let Some(element) = class.element(self.name_crc()) else {
            log::trace!("`{}` has no field `{}`, skipped", class.name(), self.name());
            return;
        };
        let Some(access) = element.access() else {
            return;
        };
        let child_class = match sc.stored_class(self.type_uuid(), class, element) {
            Ok(child_class) => child_class,
            Err(error) => {
                errors.report_error(&error.to_string());
                return;
            }
        };

        if !element.is_pointer() {
            if let Some(field) = access.get_mut(target) {
                self.load_into(sc, field, child_class, Some(element), errors);
            }
            return;
        }

        let Some(mut pointee) = child_class.factory().and_then(|factory| factory.create()) else {
            errors.report_error(&DataError::NoFactory { class: child_class.name().to_string() }.to_string());
            return;
        };
        self.load_into(sc, pointee.as_mut(), child_class, Some(element), errors);
        if access.install(target, pointee).is_err() {
            errors.report_error(&format!("Field `{}` cannot hold a `{}`", element.name(), child_class.name()));
        }
    }
}

impl SerializeContext {
    /// Whether data written as `stored` can be loaded as class `uuid`.
    pub fn can_load_as(&self, stored: TypeUuid, uuid: TypeUuid) -> bool {
        stored == uuid
            || self.underlying_type_id(uuid) == Some(stored)
            || self.generic_class_info(uuid).is_some_and(|info| info.can_store(stored))
    }

    /// The class to load a node written as `stored` into `element`.
    pub(crate) fn stored_class(
        &self,
        stored: TypeUuid,
        parent: &ClassData,
        element: &ClassElement,
    ) -> Result<&ClassData, DataError> {
        let declared = element.generic().unwrap_or(element.type_uuid());
        if self.can_load_as(stored, declared) {
            return self
                .find_class_data(declared, Some(parent), element.name_crc())
                .ok_or(DataError::UnregisteredType { uuid: declared });
        }

        if element.is_pointer() {
            let class = self
                .find_class_data(stored, Some(parent), element.name_crc())
                .ok_or(DataError::UnregisteredType { uuid: stored })?;
            if declared.is_null() || self.can_downcast(stored, declared) {
                return Ok(class);
            }
        } else if self.find_class_data(stored, Some(parent), element.name_crc()).is_none() {
            return Err(DataError::UnregisteredType { uuid: stored });
        }

        Err(DataError::TypeMismatch {
            expected: declared,
            found: stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::impls::DynamicSerializableField;
    use crate::info::name_crc;
    use crate::test_types::{Base, Derived, Holder, Shape, reflect_all};

    fn context() -> SerializeContext {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);
        sc
    }

    #[test]
    fn primitive_round_trip() {
        let sc = context();
        let mut node = DataElementNode::new("value");
        assert_eq!(node.set_data(&sc, &-7_i64), Ok(SetDataOutcome::Written));
        assert_eq!(node.element().buffer().len(), 8);

        let mut out = 0_i64;
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out, -7);
        assert_eq!(node.name(), "value");
    }

    #[test]
    fn composite_round_trip() {
        let sc = context();
        let source = Derived {
            base: Base { x: 3 },
            y: 4,
            shape: Shape::Sphere,
            values: vec![7, 8, 9],
        };
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &source).unwrap();

        let names: Vec<&str> = node.children().iter().map(DataElementNode::name).collect();
        assert_eq!(names, ["BaseClass1", "y", "shape", "values"]);
        assert_eq!(node.find_sub_element(name_crc("values")).unwrap().num_sub_elements(), 3);

        let mut out = Derived::default();
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn text_and_big_endian_payloads() {
        let sc = context();
        let source = Derived {
            y: 258,
            values: vec![1],
            ..Default::default()
        };

        for data_type in [DataType::Text, DataType::BinaryBe] {
            let mut node = DataElementNode::new("root");
            let mut errors = ErrorHandler::new();
            node.set_data_any(&sc, &source, Derived::type_uuid(), data_type, &mut errors)
                .unwrap();
            let y = node.find_sub_element(name_crc("y")).unwrap();
            assert_eq!(y.data_type(), data_type);
            if data_type == DataType::Text {
                assert_eq!(y.element().buffer(), b"258");
            } else {
                assert_eq!(y.element().buffer(), [0, 0, 1, 2]);
            }

            let mut out = Derived::default();
            node.get_data(&sc, &mut out).unwrap();
            assert_eq!(out, source);
        }
    }

    #[test]
    fn pointers_maps_and_sets() {
        let sc = context();
        let source = Holder {
            boxed: Some(Box::new(Base { x: 1 })),
            dynamic: Some(Box::new(Derived { y: 5, ..Default::default() })),
            list: vec![Shape::Sphere],
            names: [(3, String::from("three"))].into(),
            tags: [4_u32, 5].into_iter().collect(),
            empty: None,
        };
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &source).unwrap();
        assert!(node.find_sub_element(name_crc("empty")).is_none());

        let mut out = Holder::default();
        node.get_data(&sc, &mut out).unwrap();
        assert!(sc.compare_instances(&source, &out, Holder::type_uuid()));
    }

    #[test]
    fn dynamic_field() {
        let sc = context();
        let source = DynamicSerializableField::new(Base { x: 12 });
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &source).unwrap();

        let mut out = DynamicSerializableField::empty();
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out.get::<Base>(), Some(&Base { x: 12 }));
    }

    #[test]
    fn type_mismatch_leaves_target() {
        let sc = context();
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &String::from("text")).unwrap();

        let mut out = 5_i32;
        let result = node.get_data(&sc, &mut out);
        assert!(matches!(result, Err(DataError::TypeMismatch { .. })));
        assert_eq!(out, 5);
    }

    #[test]
    fn enum_accepts_underlying() {
        let sc = context();
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &1_u8).unwrap();

        let mut out = Shape::Box;
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out, Shape::Sphere);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let sc = context();
        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &Base { x: 2 }).unwrap();
        node.add_element_with_data(&sc, "gone", &9_u32).unwrap();

        let mut out = Base::default();
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out.x, 2);
    }

    #[test]
    fn do_save_skips() {
        #[derive(Default)]
        struct Secret {
            keep: bool,
        }
        crate::impl_type_info!(Secret, "Secret", 0x8c1b7e9a_51f2_4d30_b7a6_2e9d4c8f1a05);

        let mut sc = SerializeContext::new();
        sc.class::<Secret>()
            .do_save(|s| s.keep)
            .field("keep", |s| &s.keep, |s| &mut s.keep);

        let mut node = DataElementNode::new("root");
        assert_eq!(node.set_data(&sc, &Secret { keep: false }), Ok(SetDataOutcome::Skipped));
        assert_eq!(node.type_uuid(), TypeUuid::NULL);
        assert_eq!(node.set_data(&sc, &Secret { keep: true }), Ok(SetDataOutcome::Written));
        assert_eq!(node.num_sub_elements(), 1);
    }

    #[test]
    fn unregistered_field_type_fails_write() {
        #[derive(Default)]
        struct Odd {
            inner: Option<Box<dyn Any>>,
        }
        crate::impl_type_info!(Odd, "Odd", 0x8c1b7e9a_51f2_4d30_b7a6_2e9d4c8f1a06);
        struct Unknown;

        let mut sc = SerializeContext::new();
        sc.class::<Odd>().dyn_field("inner", |o| &o.inner, |o| &mut o.inner);

        let mut node = DataElementNode::new("root");
        let odd = Odd {
            inner: Some(Box::new(Unknown)),
        };
        assert!(matches!(node.set_data(&sc, &odd), Err(DataError::Reported { count: 1 })));
        assert_eq!(node.type_uuid(), TypeUuid::NULL);
    }
}
