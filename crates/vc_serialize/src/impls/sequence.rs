use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::Any;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::info::{TypeInfo, TypeUuid};
use crate::interfaces::DataContainer;
use crate::{ClassElement, SerializeContext};

const VEC_TEMPLATE: TypeUuid = TypeUuid::from_u128(0xa60e3e61_1ff6_4982_b6b8_9e4350c4c679);
const BOX_TEMPLATE: TypeUuid = TypeUuid::from_u128(0xb2f6a4d0_37c1_4e5a_8f27_90d1c3e6a5b4);

// -----------------------------------------------------------------------------
// Vec

/// Container of `Vec<T>`.
pub struct VecContainer<T> {
    element: ClassElement,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TypeInfo> VecContainer<T> {
    pub fn new() -> Self {
        Self {
            element: ClassElement::new("element", T::type_uuid(), size_of::<T>()),
            _marker: PhantomData,
        }
    }
}

impl<T: TypeInfo> Default for VecContainer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TypeInfo + Default> DataContainer for VecContainer<T> {
    fn element(&self, name_crc: u32) -> Option<&ClassElement> {
        (name_crc == self.element.name_crc()).then_some(&self.element)
    }

    fn enum_types(&self, cb: &mut dyn FnMut(TypeUuid, &ClassElement) -> bool) {
        cb(self.element.type_uuid(), &self.element);
    }

    fn enum_elements(&self, instance: &dyn Any, cb: &mut dyn FnMut(&dyn Any, &ClassElement) -> bool) {
        let Some(items) = instance.downcast_ref::<Vec<T>>() else {
            return;
        };
        for item in items {
            if !cb(item, &self.element) {
                break;
            }
        }
    }

    fn enum_elements_mut(
        &self,
        instance: &mut dyn Any,
        cb: &mut dyn FnMut(&mut dyn Any, &ClassElement) -> bool,
    ) {
        let Some(items) = instance.downcast_mut::<Vec<T>>() else {
            return;
        };
        for item in items {
            if !cb(item, &self.element) {
                break;
            }
        }
    }

    fn size(&self, instance: &dyn Any) -> usize {
        instance.downcast_ref::<Vec<T>>().map_or(0, Vec::len)
    }

    fn capacity(&self, instance: &dyn Any) -> usize {
        instance.downcast_ref::<Vec<T>>().map_or(0, Vec::capacity)
    }

    #[inline]
    fn is_stable_elements(&self) -> bool {
        false
    }

    #[inline]
    fn is_sequence_container(&self) -> bool {
        true
    }

    #[inline]
    fn can_access_elements_by_index(&self) -> bool {
        true
    }

    fn element_by_index<'a>(&self, instance: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
        let item = instance.downcast_ref::<Vec<T>>()?.get(index)?;
        Some(item as &dyn Any)
    }

    fn element_by_index_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
        index: usize,
    ) -> Option<&'a mut dyn Any> {
        let item = instance.downcast_mut::<Vec<T>>()?.get_mut(index)?;
        Some(item as &mut dyn Any)
    }

    fn swap_elements(&self, instance: &mut dyn Any, a: usize, b: usize) -> bool {
        match instance.downcast_mut::<Vec<T>>() {
            Some(items) if a < items.len() && b < items.len() => {
                items.swap(a, b);
                true
            }
            _ => false,
        }
    }

    fn reserve_element(&self, _instance: &mut dyn Any, _element: &ClassElement) -> Option<Box<dyn Any>> {
        Some(Box::new(T::default()))
    }

    fn store_element(&self, instance: &mut dyn Any, element: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        let Some(items) = instance.downcast_mut::<Vec<T>>() else {
            return Err(element);
        };
        items.push(*element.downcast::<T>()?);
        Ok(())
    }

    fn remove_element(&self, instance: &mut dyn Any, index: usize) -> bool {
        match instance.downcast_mut::<Vec<T>>() {
            Some(items) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        }
    }

    fn clear_elements(&self, instance: &mut dyn Any) {
        if let Some(items) = instance.downcast_mut::<Vec<T>>() {
            items.clear();
        }
    }
}

impl<T: TypeInfo + Default> TypeInfo for Vec<T> {
    fn type_uuid() -> TypeUuid {
        VEC_TEMPLATE.specialize(&[T::type_uuid()])
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::type_name()))
    }

    fn reflect_generic(sc: &mut SerializeContext) {
        sc.generic_class::<Self>(VEC_TEMPLATE, &[T::type_uuid()])
            .depends_on::<T>()
            .data_container(VecContainer::<T>::new());
    }
}

// -----------------------------------------------------------------------------
// Box

/// Container of `Box<T>`, a smart pointer that always holds one element.
pub struct BoxContainer<T> {
    element: ClassElement,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TypeInfo> BoxContainer<T> {
    pub fn new() -> Self {
        Self {
            element: ClassElement::new("element", T::type_uuid(), size_of::<T>()),
            _marker: PhantomData,
        }
    }
}

impl<T: TypeInfo> Default for BoxContainer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TypeInfo + Default> DataContainer for BoxContainer<T> {
    fn element(&self, name_crc: u32) -> Option<&ClassElement> {
        (name_crc == self.element.name_crc()).then_some(&self.element)
    }

    fn enum_types(&self, cb: &mut dyn FnMut(TypeUuid, &ClassElement) -> bool) {
        cb(self.element.type_uuid(), &self.element);
    }

    fn enum_elements(&self, instance: &dyn Any, cb: &mut dyn FnMut(&dyn Any, &ClassElement) -> bool) {
        if let Some(boxed) = instance.downcast_ref::<Box<T>>() {
            let value: &T = boxed;
            cb(value, &self.element);
        }
    }

    fn enum_elements_mut(
        &self,
        instance: &mut dyn Any,
        cb: &mut dyn FnMut(&mut dyn Any, &ClassElement) -> bool,
    ) {
        if let Some(boxed) = instance.downcast_mut::<Box<T>>() {
            let value: &mut T = boxed;
            cb(value, &self.element);
        }
    }

    fn size(&self, instance: &dyn Any) -> usize {
        usize::from(instance.is::<Box<T>>())
    }

    #[inline]
    fn is_stable_elements(&self) -> bool {
        true
    }

    #[inline]
    fn is_fixed_size(&self) -> bool {
        true
    }

    #[inline]
    fn is_smart_pointer(&self) -> bool {
        true
    }

    fn reserve_element(&self, _instance: &mut dyn Any, _element: &ClassElement) -> Option<Box<dyn Any>> {
        Some(Box::new(T::default()))
    }

    fn store_element(&self, instance: &mut dyn Any, element: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        let Some(boxed) = instance.downcast_mut::<Box<T>>() else {
            return Err(element);
        };
        *boxed = element.downcast::<T>()?;
        Ok(())
    }

    /// A box cannot be empty.
    fn remove_element(&self, _instance: &mut dyn Any, _index: usize) -> bool {
        false
    }

    /// Resets the pointee to its default.
    fn clear_elements(&self, instance: &mut dyn Any) {
        if let Some(boxed) = instance.downcast_mut::<Box<T>>() {
            **boxed = T::default();
        }
    }
}

impl<T: TypeInfo + Default> TypeInfo for Box<T> {
    fn type_uuid() -> TypeUuid {
        BOX_TEMPLATE.specialize(&[T::type_uuid()])
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Box<{}>", T::type_name()))
    }

    fn reflect_generic(sc: &mut SerializeContext) {
        sc.generic_class::<Self>(BOX_TEMPLATE, &[T::type_uuid()])
            .depends_on::<T>()
            .data_container(BoxContainer::<T>::new());
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::impl_type_info;
    use crate::test_types::{Base, reflect_all};
    use crate::tree::DataElementNode;

    #[derive(Debug, Default, PartialEq)]
    struct Owner {
        inner: Box<Base>,
        values: Vec<i32>,
    }

    impl_type_info!(Owner, "Owner", 0x2d9c4e71_6a0b_4f3e_9b58_c1e7a4d3f601);

    fn context() -> SerializeContext {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);
        sc.class::<Owner>()
            .field("inner", |o| &o.inner, |o| &mut o.inner)
            .field("values", |o| &o.values, |o| &mut o.values);
        sc
    }

    #[test]
    fn vec_index_swap_remove() {
        let container = VecContainer::<i32>::new();
        let mut items = vec![1, 2, 3];
        assert_eq!(container.size(&items), 3);
        assert!(container.capacity(&items) >= 3);

        let second = container.element_by_index(&items, 1);
        assert_eq!(second.and_then(|v| v.downcast_ref::<i32>()), Some(&2));
        assert!(container.element_by_index(&items, 3).is_none());

        if let Some(first) = container
            .element_by_index_mut(&mut items, 0)
            .and_then(|v| v.downcast_mut::<i32>())
        {
            *first = 10;
        }
        assert!(container.swap_elements(&mut items, 0, 2));
        assert!(!container.swap_elements(&mut items, 0, 3));
        assert_eq!(items, [3, 2, 10]);

        assert!(container.remove_element(&mut items, 1));
        assert!(!container.remove_element(&mut items, 2));
        assert_eq!(items, [3, 10]);

        items.extend([4, 5]);
        assert_eq!(container.remove_elements(&mut items, &[3, 0, 0, 9]), 2);
        assert_eq!(items, [10, 4]);
    }

    #[test]
    fn box_holds_one_element() {
        let container = BoxContainer::<Base>::new();
        let mut boxed = Box::new(Base { x: 3 });
        assert_eq!(container.size(&boxed), 1);
        assert!(container.is_smart_pointer());
        assert!(!container.remove_element(&mut boxed, 0));

        container.clear_elements(&mut boxed);
        assert_eq!(*boxed, Base::default());

        let element = container.element(crate::info::name_crc("element")).unwrap();
        let reserved = container.reserve_element(&mut boxed, element).unwrap();
        assert!(container.store_element(&mut boxed, reserved).is_ok());
        assert!(container.store_element(&mut boxed, Box::new(1_u8)).is_err());
    }

    #[test]
    fn box_field_round_trip_and_clone() {
        let sc = context();
        assert!(sc.find_class_data(<Box<Base>>::type_uuid(), None, 0).is_some());

        let owner = Owner {
            inner: Box::new(Base { x: 8 }),
            values: vec![1, 2],
        };
        let mut node = DataElementNode::new("owner");
        node.set_data(&sc, &owner).unwrap();

        let mut out = Owner::default();
        node.get_data(&sc, &mut out).unwrap();
        assert_eq!(out, owner);

        let clone = sc.clone_object(&owner).unwrap();
        let clone = clone.downcast_ref::<Owner>().unwrap();
        assert_eq!(clone, &owner);
        assert!(!core::ptr::eq(&*clone.inner, &*owner.inner));
        assert!(sc.compare_instances(&owner, clone, Owner::type_uuid()));
    }
}
