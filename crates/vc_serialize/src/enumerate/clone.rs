use alloc::boxed::Box;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;

use crate::enumerate::{not_registered, stack_entry};
use crate::enumerate::{EnumerateFlags, ErrorHandler, InstanceVisitorMut};
use crate::info::{TypeUuid, name_crc};
use crate::{ClassData, ClassElement, SerializeContext};

// -----------------------------------------------------------------------------
// Clone

/// Fires `on_object_cloned` on every object of a cloned graph.
struct ClonedNotifier;

impl InstanceVisitorMut for ClonedNotifier {
    fn begin(&mut self, instance: &mut dyn Any, class: &ClassData, _: Option<&ClassElement>) -> bool {
        if let Some(handler) = class.event_handler() {
            handler.on_object_cloned(instance);
        }
        true
    }
}

impl SerializeContext {
    /// Deep copies `source`. Its class is found from its native type.
    ///
    /// Returns `None` if the type is not registered, cannot be created or
    /// any part of it failed to copy.
    pub fn clone_object(&self, source: &dyn Any) -> Option<Box<dyn Any>> {
        let uuid = self.type_uuid_of_native(source.type_id())?;
        self.clone_object_as(source, uuid)
    }

    /// Deep copies `source` as an instance of class `uuid`.
    pub fn clone_object_as(&self, source: &dyn Any, uuid: TypeUuid) -> Option<Box<dyn Any>> {
        let mut clone = self.create_any(uuid)?;
        let mut errors = ErrorHandler::new();
        self.clone_object_inplace(clone.as_mut(), source, uuid, &mut errors);
        (!errors.has_errors()).then_some(clone)
    }

    /// Copies `source` into the existing `dest`, both of class `uuid`.
    ///
    /// Leaves go through their serializer and its `post_clone` hook.
    /// Containers in `dest` are cleared first. Failures are reported to
    /// `errors` and the copy goes on with the next element.
    pub fn clone_object_inplace(
        &self,
        dest: &mut dyn Any,
        source: &dyn Any,
        uuid: TypeUuid,
        errors: &mut ErrorHandler,
    ) -> bool {
        let Some(class) = self.find_class_data(uuid, None, 0) else {
            errors.report_error(&not_registered(uuid));
            return false;
        };
        let before = errors.error_count();
        self.copy_into(dest, source, class, None, errors);
        self.enumerate_instance(dest, uuid, &mut ClonedNotifier, EnumerateFlags::empty(), errors);
        errors.error_count() == before
    }

    fn copy_into(
        &self,
        dest: &mut dyn Any,
        source: &dyn Any,
        class: &ClassData,
        element: Option<&ClassElement>,
        errors: &mut ErrorHandler,
    ) {
        errors.push(stack_entry(class, element));

        if let Some(serializer) = class.serializer() {
            let mut data = Vec::new();
            let copied = serializer
                .save(source, &mut data, false)
                .and_then(|()| serializer.load(dest, &data, class.version, false));
            match copied {
                Ok(()) => serializer.post_clone(dest),
                Err(error) => errors.report_error(&format!("Failed to clone `{}`: {error}", class.name)),
            }
        } else if let Some(container) = class.container() {
            container.clear_elements(dest);
            container.enum_elements(source, &mut |child, child_element| {
                let uuid = self.element_value_type(child_element, child);
                let Some(child_class) = self.find_class_data(uuid, Some(class), child_element.name_crc)
                else {
                    errors.report_error(&not_registered(uuid));
                    return true;
                };
                let Some(mut reserved) = container.reserve_element(dest, child_element) else {
                    errors.report_error(&format!("Container `{}` is full", class.name));
                    return false;
                };
                self.copy_into(reserved.as_mut(), child, child_class, Some(child_element), errors);
                if let Err(rejected) = container.store_element(dest, reserved) {
                    container.free_reserved_element(dest, rejected);
                    errors.report_error(&format!("Container `{}` rejected an element", class.name));
                }
                true
            });
            container.elements_updated(dest);
        } else {
            for child_element in class.elements() {
                self.copy_element(dest, source, class, child_element, errors);
            }
        }

        errors.pop();
    }

    fn copy_element(
        &self,
        dest: &mut dyn Any,
        source: &dyn Any,
        class: &ClassData,
        element: &ClassElement,
        errors: &mut ErrorHandler,
    ) {
        let Some(access) = element.access() else {
            return;
        };
        let Some(child) = access.get(source) else {
            access.reset(dest);
            return;
        };
        let uuid = self.element_value_type(element, child);
        let Some(child_class) = self.find_class_data(uuid, Some(class), element.name_crc) else {
            errors.report_error(&not_registered(uuid));
            return;
        };

        if element.is_pointer() {
            let Some(mut pointee) = child_class.factory().and_then(|factory| factory.create()) else {
                errors.report_error(&format!("Class `{}` cannot be created", child_class.name));
                return;
            };
            self.copy_into(pointee.as_mut(), child, child_class, Some(element), errors);
            if access.install(dest, pointee).is_err() {
                errors.report_error(&format!("Field `{}` rejected a `{}`", element.name, child_class.name));
            }
        } else if let Some(child_dest) = access.get_mut(dest) {
            self.copy_into(child_dest, child, child_class, Some(element), errors);
        }
    }
}

// -----------------------------------------------------------------------------
// Compare

impl SerializeContext {
    /// Structural comparison of two instances of class `uuid`.
    ///
    /// Leaves compare through their serializer. Sequences compare element
    /// by element; other containers compare as multisets. Pointers are
    /// equal if both are null or both point to equal values of the same
    /// class.
    pub fn compare_instances(&self, lhs: &dyn Any, rhs: &dyn Any, uuid: TypeUuid) -> bool {
        self.find_class_data(uuid, None, 0)
            .is_some_and(|class| self.compare_with(lhs, rhs, class))
    }

    fn compare_with(&self, lhs: &dyn Any, rhs: &dyn Any, class: &ClassData) -> bool {
        if let Some(serializer) = class.serializer() {
            return serializer.compare_value_data(lhs, rhs);
        }

        let Some(container) = class.container() else {
            return class.elements().iter().all(|element| {
                let Some(access) = element.access() else {
                    return true;
                };
                match (access.get(lhs), access.get(rhs)) {
                    (None, None) => true,
                    (Some(lhs), Some(rhs)) => self.compare_child(lhs, rhs, class, element),
                    _ => false,
                }
            });
        };

        let size = container.size(lhs);
        if size != container.size(rhs) {
            return false;
        }

        if container.can_access_elements_by_index() {
            let Some(element) = container.element(name_crc(container.element_name())) else {
                return size == 0;
            };
            return (0..size).all(|index| {
                match (
                    container.element_by_index(lhs, index),
                    container.element_by_index(rhs, index),
                ) {
                    (Some(lhs), Some(rhs)) => self.compare_child(lhs, rhs, class, element),
                    _ => false,
                }
            });
        }

        let mut used = vec![false; size];
        let mut equal = true;
        container.enum_elements(lhs, &mut |lhs, element| {
            let mut index = 0;
            let mut found = false;
            container.enum_elements(rhs, &mut |rhs, _| {
                if !used[index] && self.compare_child(lhs, rhs, class, element) {
                    used[index] = true;
                    found = true;
                }
                index += 1;
                !found
            });
            equal &= found;
            equal
        });
        equal
    }

    fn compare_child(&self, lhs: &dyn Any, rhs: &dyn Any, parent: &ClassData, element: &ClassElement) -> bool {
        let uuid = self.element_value_type(element, lhs);
        if uuid != self.element_value_type(element, rhs) {
            return false;
        }
        self.find_class_data(uuid, Some(parent), element.name_crc)
            .is_some_and(|class| self.compare_with(lhs, rhs, class))
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use core::any::Any;

    use crate::TypeInfo;
    use crate::enumerate::ErrorHandler;
    use crate::test_types::{Base, Derived, Holder, Shape, Tagged, reflect_all};
    use crate::SerializeContext;

    fn holder() -> Holder {
        Holder {
            boxed: Some(Box::new(Base { x: 4 })),
            dynamic: Some(Box::new(Derived {
                base: Base { x: 1 },
                y: 2,
                shape: Shape::Sphere,
                values: vec![5, 6],
            })),
            list: vec![Shape::Sphere, Shape::Box],
            names: [(1, String::from("one")), (2, String::from("two"))].into(),
            ..Default::default()
        }
    }

    #[test]
    fn clone_is_deep_and_equal() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let source = holder();
        let clone = sc.clone_object(&source).unwrap();
        let clone = clone.downcast_ref::<Holder>().unwrap();

        assert!(sc.compare_instances(&source, clone, Holder::type_uuid()));
        assert_eq!(clone.boxed.as_deref().map(|b| b.x), Some(4));
        assert!(!core::ptr::eq(
            source.boxed.as_deref().unwrap(),
            clone.boxed.as_deref().unwrap()
        ));
        let derived = clone.dynamic.as_deref().and_then(|d| d.downcast_ref::<Derived>());
        assert_eq!(derived.map(|d| d.values.as_slice()), Some(&[5, 6][..]));
        assert_eq!(clone.names.get(&2).map(String::as_str), Some("two"));
        assert!(clone.empty.is_none());
    }

    #[test]
    fn clone_into_existing() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let source = Holder::default();
        let mut dest = holder();
        let mut errors = ErrorHandler::new();
        assert!(sc.clone_object_inplace(&mut dest, &source, Holder::type_uuid(), &mut errors));
        assert!(dest.boxed.is_none());
        assert!(dest.dynamic.is_none());
        assert!(dest.list.is_empty());
        assert!(dest.names.is_empty());
    }

    #[test]
    fn cloned_hook_fires() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let clone = sc.clone_object(&Tagged::default()).unwrap();
        assert_eq!(clone.downcast_ref::<Tagged>().unwrap().cloned, 1);
    }

    #[test]
    fn compare_detects_differences() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let lhs = holder();
        let mut rhs = holder();
        assert!(sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));

        rhs.list.swap(0, 1);
        assert!(!sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));
        rhs.list.swap(0, 1);

        rhs.dynamic = Some(Box::new(Base::default()) as Box<dyn Any>);
        assert!(!sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));
        rhs.dynamic = None;
        assert!(!sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));
    }

    #[test]
    fn unordered_containers_compare_as_multisets() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let lhs = Holder {
            tags: [1_u32, 2, 3].into_iter().collect(),
            ..Default::default()
        };
        let mut rhs = Holder {
            tags: [3_u32, 1, 2].into_iter().collect(),
            ..Default::default()
        };
        assert!(sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));
        rhs.tags.remove(&3);
        rhs.tags.insert(4);
        assert!(!sc.compare_instances(&lhs, &rhs, Holder::type_uuid()));
    }
}
