use alloc::format;
use core::any::Any;

use bitflags::bitflags;

use crate::enumerate::{DbgStackEntry, ErrorHandler};
use crate::info::TypeUuid;
use crate::{ClassData, ClassElement, SerializeContext};

bitflags! {
    /// Access mode of an instance walk.
    ///
    /// The mode selects the lifecycle hooks fired on classes with an
    /// [`EventHandler`](crate::interfaces::EventHandler). It never changes
    /// the visit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnumerateFlags: u8 {
        /// Fire the read hooks; the instance is a data source.
        const FOR_READ  = 1 << 0;
        /// Fire the write hooks; the instance is being filled.
        const FOR_WRITE = 1 << 1;
        /// Fire only the begin hooks. The caller fires the end hooks later.
        const HOLD      = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// Visitors

/// Callbacks of a shared instance walk.
///
/// `begin` is called on entering a node with the node's instance, its
/// class and the element it was reached through (`None` for the root).
/// Returning `false` skips the node's children. `end` is always called
/// after `begin`; returning `false` skips the node's remaining siblings.
pub trait InstanceVisitor {
    fn begin(&mut self, instance: &dyn Any, class: &ClassData, element: Option<&ClassElement>) -> bool;

    #[inline]
    fn end(&mut self) -> bool {
        true
    }
}

/// Callbacks of a mutable instance walk. See [`InstanceVisitor`].
pub trait InstanceVisitorMut {
    fn begin(
        &mut self,
        instance: &mut dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
    ) -> bool;

    #[inline]
    fn end(&mut self) -> bool {
        true
    }
}

/// An [`InstanceVisitor`] made of two closures.
pub struct FnVisitor<B, E> {
    pub begin: B,
    pub end: E,
}

impl<B, E> InstanceVisitor for FnVisitor<B, E>
where
    B: FnMut(&dyn Any, &ClassData, Option<&ClassElement>) -> bool,
    E: FnMut() -> bool,
{
    #[inline]
    fn begin(&mut self, instance: &dyn Any, class: &ClassData, element: Option<&ClassElement>) -> bool {
        (self.begin)(instance, class, element)
    }

    #[inline]
    fn end(&mut self) -> bool {
        (self.end)()
    }
}

impl<B, E> InstanceVisitorMut for FnVisitor<B, E>
where
    B: FnMut(&mut dyn Any, &ClassData, Option<&ClassElement>) -> bool,
    E: FnMut() -> bool,
{
    #[inline]
    fn begin(
        &mut self,
        instance: &mut dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
    ) -> bool {
        (self.begin)(instance, class, element)
    }

    #[inline]
    fn end(&mut self) -> bool {
        (self.end)()
    }
}

// -----------------------------------------------------------------------------
// Walks

impl SerializeContext {
    /// The id of the class to walk for the value `child` of `element`.
    ///
    /// Pointer elements may hold a derived type, found through the native
    /// type of the pointee.
    pub(crate) fn element_value_type(&self, element: &ClassElement, child: &dyn Any) -> TypeUuid {
        if element.is_pointer()
            && let Some(actual) = self.type_uuid_of_native(child.type_id())
        {
            return actual;
        }
        element.generic.unwrap_or(element.type_uuid)
    }

    /// Walks `instance` of class `uuid` depth first.
    ///
    /// Base classes are visited before fields, both in declaration order.
    /// Null pointers are skipped. Unregistered types are reported to
    /// `errors` and skipped; the walk goes on with the next sibling.
    ///
    /// Returns `false` if the root's `end` asked to stop.
    pub fn enumerate_instance_const(
        &self,
        instance: &dyn Any,
        uuid: TypeUuid,
        visitor: &mut dyn InstanceVisitor,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let Some(class) = self.find_class_data(uuid, None, 0) else {
            errors.report_error(&not_registered(uuid));
            return true;
        };
        self.walk_const(instance, class, None, visitor, flags, errors)
    }

    fn walk_const(
        &self,
        instance: &dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
        visitor: &mut dyn InstanceVisitor,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let handler = class.event_handler();
        if flags.contains(EnumerateFlags::FOR_READ)
            && let Some(handler) = handler
        {
            handler.on_read_begin(instance);
        }
        errors.push(stack_entry(class, element));

        if visitor.begin(instance, class, element) {
            if let Some(container) = class.container() {
                container.enum_elements(instance, &mut |child, child_element| {
                    self.walk_child_const(child, class, child_element, visitor, flags, errors)
                });
            } else if !class.is_leaf() {
                for child_element in class.elements() {
                    let Some(child) = child_element.access().and_then(|access| access.get(instance))
                    else {
                        continue;
                    };
                    if !self.walk_child_const(child, class, child_element, visitor, flags, errors) {
                        break;
                    }
                }
            }
        }

        errors.pop();
        if flags.contains(EnumerateFlags::FOR_READ)
            && !flags.contains(EnumerateFlags::HOLD)
            && let Some(handler) = handler
        {
            handler.on_read_end(instance);
        }
        visitor.end()
    }

    fn walk_child_const(
        &self,
        child: &dyn Any,
        parent: &ClassData,
        element: &ClassElement,
        visitor: &mut dyn InstanceVisitor,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let uuid = self.element_value_type(element, child);
        match self.find_class_data(uuid, Some(parent), element.name_crc) {
            Some(class) => self.walk_const(child, class, Some(element), visitor, flags, errors),
            None => {
                errors.report_error(&not_registered(uuid));
                true
            }
        }
    }

    /// Mutable variant of
    /// [`enumerate_instance_const`](Self::enumerate_instance_const).
    pub fn enumerate_instance(
        &self,
        instance: &mut dyn Any,
        uuid: TypeUuid,
        visitor: &mut dyn InstanceVisitorMut,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let Some(class) = self.find_class_data(uuid, None, 0) else {
            errors.report_error(&not_registered(uuid));
            return true;
        };
        self.walk_mut(instance, class, None, visitor, flags, errors)
    }

    fn walk_mut(
        &self,
        instance: &mut dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
        visitor: &mut dyn InstanceVisitorMut,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let handler = class.event_handler();
        if let Some(handler) = handler {
            if flags.contains(EnumerateFlags::FOR_READ) {
                handler.on_read_begin(instance);
            }
            if flags.contains(EnumerateFlags::FOR_WRITE) {
                handler.on_write_begin(instance);
            }
        }
        errors.push(stack_entry(class, element));

        if visitor.begin(instance, class, element) {
            if let Some(container) = class.container() {
                container.enum_elements_mut(instance, &mut |child, child_element| {
                    self.walk_child_mut(child, class, child_element, visitor, flags, errors)
                });
            } else if !class.is_leaf() {
                for child_element in class.elements() {
                    let Some(child) = child_element
                        .access()
                        .and_then(|access| access.get_mut(instance))
                    else {
                        continue;
                    };
                    if !self.walk_child_mut(child, class, child_element, visitor, flags, errors) {
                        break;
                    }
                }
            }
        }

        errors.pop();
        if let Some(handler) = handler
            && !flags.contains(EnumerateFlags::HOLD)
        {
            if flags.contains(EnumerateFlags::FOR_WRITE) {
                handler.on_write_end(instance);
            }
            if flags.contains(EnumerateFlags::FOR_READ) {
                handler.on_read_end(instance);
            }
        }
        visitor.end()
    }

    fn walk_child_mut(
        &self,
        child: &mut dyn Any,
        parent: &ClassData,
        element: &ClassElement,
        visitor: &mut dyn InstanceVisitorMut,
        flags: EnumerateFlags,
        errors: &mut ErrorHandler,
    ) -> bool {
        let uuid = self.element_value_type(element, child);
        match self.find_class_data(uuid, Some(parent), element.name_crc) {
            Some(class) => self.walk_mut(child, class, Some(element), visitor, flags, errors),
            None => {
                errors.report_error(&not_registered(uuid));
                true
            }
        }
    }
}

pub(crate) fn not_registered(uuid: TypeUuid) -> alloc::string::String {
    format!("Element with class ID '{uuid}' is not registered with the serializer!")
}

pub(crate) fn stack_entry(class: &ClassData, element: Option<&ClassElement>) -> DbgStackEntry {
    let entry = DbgStackEntry::new(class.type_uuid()).with_class(class.name.clone());
    match element {
        Some(element) => entry.with_element(element.name.clone()),
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;

    use super::*;
    use crate::TypeInfo;
    use crate::test_types::{Base, Derived, Holder, Shape, reflect_all};

    fn visit_names(sc: &SerializeContext, instance: &dyn Any, uuid: TypeUuid) -> Vec<String> {
        let mut names = Vec::new();
        let mut visitor = FnVisitor {
            begin: |_: &dyn Any, class: &ClassData, element: Option<&ClassElement>| {
                names.push(match element {
                    Some(element) => format!("{}.{}", class.name(), element.name()),
                    None => class.name().to_string(),
                });
                true
            },
            end: || true,
        };
        let mut errors = ErrorHandler::new();
        sc.enumerate_instance_const(instance, uuid, &mut visitor, EnumerateFlags::FOR_READ, &mut errors);
        assert!(!errors.has_errors());
        names
    }

    #[test]
    fn bases_before_fields() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let derived = Derived {
            base: Base { x: 1 },
            y: 2,
            ..Default::default()
        };
        let mut ints = Vec::new();
        let mut visitor = FnVisitor {
            begin: |instance: &dyn Any, _: &ClassData, element: Option<&ClassElement>| {
                if let (Some(value), Some(element)) = (instance.downcast_ref::<i32>(), element) {
                    ints.push((element.name().to_string(), *value));
                }
                true
            },
            end: || true,
        };
        let mut errors = ErrorHandler::new();
        sc.enumerate_instance_const(
            &derived,
            Derived::type_uuid(),
            &mut visitor,
            EnumerateFlags::FOR_READ,
            &mut errors,
        );
        assert_eq!(ints, [("x".to_string(), 1), ("y".to_string(), 2)]);
    }

    #[test]
    fn skip_children_and_siblings() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);
        let derived = Derived::default();

        let mut names = Vec::new();
        let mut visitor = FnVisitor {
            begin: |_: &dyn Any, class: &ClassData, _: Option<&ClassElement>| {
                names.push(class.name().to_string());
                class.name() != "Base"
            },
            end: || true,
        };
        let mut errors = ErrorHandler::new();
        sc.enumerate_instance_const(&derived, Derived::type_uuid(), &mut visitor, EnumerateFlags::empty(), &mut errors);
        assert_eq!(names, ["Derived", "Base", "i32", "Shape", "Vec<i32>"]);

        let mut count = 0;
        let mut visitor = FnVisitor {
            begin: |_: &dyn Any, _: &ClassData, _: Option<&ClassElement>| true,
            end: || {
                count += 1;
                count < 2
            },
        };
        sc.enumerate_instance_const(&derived, Derived::type_uuid(), &mut visitor, EnumerateFlags::empty(), &mut errors);
        // x ends, then Base ends and stops its siblings, then the root.
        assert_eq!(count, 3);
    }

    #[test]
    fn pointers_and_containers() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let holder = Holder {
            boxed: Some(Box::new(Base { x: 3 })),
            dynamic: Some(Box::new(Derived::default())),
            list: vec![Shape::Sphere],
            ..Default::default()
        };
        let names = visit_names(&sc, &holder, Holder::type_uuid());
        assert!(names.contains(&"Base.boxed".to_string()));
        assert!(names.contains(&"Derived.dynamic".to_string()));
        assert!(names.contains(&"Shape.element".to_string()));
        assert!(!names.iter().any(|name| name.ends_with(".empty")));
    }

    #[test]
    fn mutable_walk() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let mut derived = Derived {
            values: vec![1, 2],
            ..Default::default()
        };
        let mut visitor = FnVisitor {
            begin: |instance: &mut dyn Any, _: &ClassData, _: Option<&ClassElement>| {
                if let Some(value) = instance.downcast_mut::<i32>() {
                    *value += 10;
                }
                true
            },
            end: || true,
        };
        let mut errors = ErrorHandler::new();
        sc.enumerate_instance(&mut derived, Derived::type_uuid(), &mut visitor, EnumerateFlags::FOR_WRITE, &mut errors);
        assert_eq!(derived.base.x, 10);
        assert_eq!(derived.y, 10);
        assert_eq!(derived.values, [11, 12]);
    }

    #[test]
    fn unregistered_root() {
        let sc = SerializeContext::new();
        let mut errors = ErrorHandler::new();
        let mut visitor = FnVisitor {
            begin: |_: &dyn Any, _: &ClassData, _: Option<&ClassElement>| true,
            end: || true,
        };
        assert!(sc.enumerate_instance_const(&0_u8, TypeUuid::from_u128(5), &mut visitor, EnumerateFlags::empty(), &mut errors));
        assert_eq!(errors.error_count(), 1);
    }
}
