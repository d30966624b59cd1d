use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::info::{TypeInfo, TypeUuid};
use crate::tree::{DataElement, DataError, DataType};
use crate::SerializeContext;

// -----------------------------------------------------------------------------
// DataElementNode

/// A [`DataElement`] and its sub elements: the serialized form of one
/// object.
///
/// A leaf node carries a payload and no children. A composite node has one
/// child per saved field, in declaration order, and the elements of a
/// container. Nodes reference classes by id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataElementNode {
    pub(crate) element: DataElement,
    pub(crate) children: Vec<DataElementNode>,
}

impl DataElementNode {
    /// Creates an untyped node.
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_element(DataElement::new(name, TypeUuid::NULL, 0))
    }

    #[inline]
    pub fn from_element(element: DataElement) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn element(&self) -> &DataElement {
        &self.element
    }

    #[inline]
    pub fn element_mut(&mut self) -> &mut DataElement {
        &mut self.element
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.element.name
    }

    #[inline]
    pub fn name_crc(&self) -> u32 {
        self.element.name_crc
    }

    #[inline]
    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.element.set_name(name);
    }

    /// Id of the class the node was written from.
    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.element.id
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.element.version
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.element.data_type
    }

    // -------------------------------------------------------------------------
    // Children

    #[inline]
    pub fn children(&self) -> &[DataElementNode] {
        &self.children
    }

    #[inline]
    pub fn num_sub_elements(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn sub_element(&self, index: usize) -> Option<&DataElementNode> {
        self.children.get(index)
    }

    #[inline]
    pub fn sub_element_mut(&mut self, index: usize) -> Option<&mut DataElementNode> {
        self.children.get_mut(index)
    }

    /// Index of the first child named with `name_crc`.
    pub fn find_element(&self, name_crc: u32) -> Option<usize> {
        self.children.iter().position(|child| child.name_crc() == name_crc)
    }

    pub fn find_sub_element(&self, name_crc: u32) -> Option<&DataElementNode> {
        self.children.iter().find(|child| child.name_crc() == name_crc)
    }

    pub fn find_sub_element_mut(&mut self, name_crc: u32) -> Option<&mut DataElementNode> {
        self.children.iter_mut().find(|child| child.name_crc() == name_crc)
    }

    /// Appends a prepared child. Returns its index.
    pub fn add_element_node(&mut self, node: DataElementNode) -> usize {
        self.children.push(node);
        self.children.len() - 1
    }

    /// Appends an empty child of class `T`. See
    /// [`add_element_by_id`](Self::add_element_by_id).
    #[inline]
    pub fn add_element<T: TypeInfo>(
        &mut self,
        sc: &SerializeContext,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<usize, DataError> {
        self.add_element_by_id(sc, name, T::type_uuid())
    }

    /// Appends an empty child of class `uuid`, at the class version.
    ///
    /// Fails if the class is not registered, or if a sibling already has
    /// this name and this node is not a container.
    pub fn add_element_by_id(
        &mut self,
        sc: &SerializeContext,
        name: impl Into<Cow<'static, str>>,
        uuid: TypeUuid,
    ) -> Result<usize, DataError> {
        let class = sc
            .find_class_data(uuid, None, 0)
            .ok_or(DataError::UnregisteredType { uuid })?;
        let element = DataElement::new(name, uuid, class.version());

        let is_container = sc
            .find_class_data(self.type_uuid(), None, 0)
            .is_some_and(|parent| parent.container().is_some());
        if !is_container && self.find_element(element.name_crc).is_some() {
            return Err(DataError::DuplicateName {
                name: element.name.into_owned(),
            });
        }
        Ok(self.add_element_node(DataElementNode::from_element(element)))
    }

    /// Appends a child of class `T` holding `value`.
    pub fn add_element_with_data<T: TypeInfo>(
        &mut self,
        sc: &SerializeContext,
        name: impl Into<Cow<'static, str>>,
        value: &T,
    ) -> Result<usize, DataError> {
        let index = self.add_element::<T>(sc, name)?;
        if let Err(error) = self.children[index].set_data(sc, value) {
            self.children.remove(index);
            return Err(error);
        }
        Ok(index)
    }

    pub fn remove_element(&mut self, index: usize) -> Option<DataElementNode> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Removes the first child named with `name_crc`.
    pub fn remove_element_by_name(&mut self, name_crc: u32) -> bool {
        self.find_element(name_crc)
            .and_then(|index| self.remove_element(index))
            .is_some()
    }

    /// Replaces the child at `index` with an empty node of class `T`.
    pub fn replace_element<T: TypeInfo>(
        &mut self,
        sc: &SerializeContext,
        index: usize,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<(), DataError> {
        let child = self.children.get_mut(index).ok_or(DataError::MissingElement)?;
        child.convert_named_by_id(sc, name, T::type_uuid())
    }

    // -------------------------------------------------------------------------
    // Convert

    /// Retypes this node to `T`, dropping its data and children.
    #[inline]
    pub fn convert<T: TypeInfo>(&mut self, sc: &SerializeContext) -> Result<(), DataError> {
        self.convert_by_id(sc, T::type_uuid())
    }

    /// Renames and retypes this node to `T`.
    #[inline]
    pub fn convert_named<T: TypeInfo>(
        &mut self,
        sc: &SerializeContext,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<(), DataError> {
        self.convert_named_by_id(sc, name, T::type_uuid())
    }

    /// Retypes this node to class `uuid`, dropping its data and children.
    /// The version becomes the class version.
    pub fn convert_by_id(&mut self, sc: &SerializeContext, uuid: TypeUuid) -> Result<(), DataError> {
        let class = sc
            .find_class_data(uuid, None, 0)
            .ok_or(DataError::UnregisteredType { uuid })?;
        self.element.id = uuid;
        self.element.version = class.version();
        self.element.data_type = DataType::Binary;
        self.element.buffer.clear();
        self.children.clear();
        Ok(())
    }

    pub fn convert_named_by_id(
        &mut self,
        sc: &SerializeContext,
        name: impl Into<Cow<'static, str>>,
        uuid: TypeUuid,
    ) -> Result<(), DataError> {
        self.convert_by_id(sc, uuid)?;
        self.set_name(name);
        Ok(())
    }

    /// Reads the child named with `name_crc` into `out`.
    pub fn get_child_data<T: TypeInfo>(
        &mut self,
        sc: &SerializeContext,
        name_crc: u32,
        out: &mut T,
    ) -> Result<(), DataError> {
        let child = self
            .find_sub_element_mut(name_crc)
            .ok_or(DataError::MissingElement)?;
        child.get_data(sc, out)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::info::name_crc;
    use crate::test_types::{Base, reflect_all};

    #[test]
    fn structure() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let mut node = DataElementNode::new("root");
        node.convert::<Base>(&sc).unwrap();
        assert_eq!(node.add_element::<i32>(&sc, "x"), Ok(0));
        assert!(matches!(
            node.add_element::<i32>(&sc, "X"),
            Err(DataError::DuplicateName { .. })
        ));
        assert!(matches!(
            node.add_element_by_id(&sc, "y", TypeUuid::from_u128(77)),
            Err(DataError::UnregisteredType { .. })
        ));

        assert_eq!(node.add_element_with_data(&sc, "name", &String::from("n")), Ok(1));
        assert_eq!(node.find_element(name_crc("name")), Some(1));
        let mut out = String::new();
        node.get_child_data(&sc, name_crc("name"), &mut out).unwrap();
        assert_eq!(out, "n");

        node.replace_element::<u8>(&sc, 1, "byte").unwrap();
        assert_eq!(node.children()[1].name(), "byte");
        assert!(node.children()[1].element().buffer().is_empty());

        assert!(node.remove_element_by_name(name_crc("x")));
        assert!(!node.remove_element_by_name(name_crc("x")));
        assert_eq!(node.num_sub_elements(), 1);
    }

    #[test]
    fn convert_resets_version() {
        let mut sc = SerializeContext::new();
        sc.class::<Base>().version(4);

        let mut node = DataElementNode::new("n");
        node.element_mut().version = 1;
        node.add_element_node(DataElementNode::new("child"));
        node.convert::<Base>(&sc).unwrap();
        assert_eq!(node.version(), 4);
        assert_eq!(node.num_sub_elements(), 0);
        assert_eq!(node.type_uuid(), Base::type_uuid());
    }
}
