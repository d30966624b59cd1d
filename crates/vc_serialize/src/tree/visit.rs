use alloc::string::String;

use crate::enumerate::{DbgStackEntry, ErrorHandler, not_registered};
use crate::tree::DataElementNode;
use crate::{ClassData, SerializeContext};

impl SerializeContext {
    /// Walks a node tree depth first, children in order.
    ///
    /// `begin` gets each node with its class and returns `false` to skip the
    /// node's children. Ids that are not registered are reported to
    /// `errors` and passed as `None`. `end` follows every `begin` and
    /// returns `false` to skip the remaining siblings.
    pub fn enumerate_data_node(
        &self,
        node: &DataElementNode,
        begin: &mut dyn FnMut(&DataElementNode, Option<&ClassData>) -> bool,
        end: &mut dyn FnMut(&DataElementNode) -> bool,
        errors: &mut ErrorHandler,
    ) -> bool {
        self.walk_data_node(node, None, begin, end, errors)
    }

    fn walk_data_node(
        &self,
        node: &DataElementNode,
        parent: Option<&ClassData>,
        begin: &mut dyn FnMut(&DataElementNode, Option<&ClassData>) -> bool,
        end: &mut dyn FnMut(&DataElementNode) -> bool,
        errors: &mut ErrorHandler,
    ) -> bool {
        let class = self.find_class_data(node.type_uuid(), parent, node.name_crc());
        let entry = match class {
            Some(class) => DbgStackEntry::new(node.type_uuid()).with_class(class.name.clone()),
            None => {
                errors.report_error(&not_registered(node.type_uuid()));
                DbgStackEntry::new(node.type_uuid())
            }
        };
        errors.push(entry.with_element(String::from(node.name())));

        if begin(node, class) {
            for child in node.children() {
                if !self.walk_data_node(child, class, begin, end, errors) {
                    break;
                }
            }
        }

        errors.pop();
        end(node)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use super::*;
    use crate::TypeInfo;
    use crate::info::TypeUuid;
    use crate::test_types::{Base, Derived, reflect_all};

    #[test]
    fn node_order() {
        let mut sc = SerializeContext::new();
        reflect_all(&mut sc);

        let mut node = DataElementNode::new("root");
        node.set_data(&sc, &Derived { base: Base { x: 1 }, ..Default::default() })
            .unwrap();

        let mut seen: Vec<String> = Vec::new();
        let mut errors = ErrorHandler::new();
        sc.enumerate_data_node(
            &node,
            &mut |node, class| {
                seen.push(node.name().to_string());
                class.is_some_and(|class| !class.is_leaf())
            },
            &mut |_| true,
            &mut errors,
        );
        assert_eq!(seen, ["root", "BaseClass1", "x", "y", "shape", "values"]);
        assert!(!errors.has_errors());
    }

    #[test]
    fn unregistered_nodes_are_reported() {
        let sc = SerializeContext::new();
        let mut node = DataElementNode::new("root");
        node.add_element_with_data(&sc, "value", &1_i32).unwrap();
        node.element.id = TypeUuid::from_u128(0x42);

        let mut classes = Vec::new();
        let mut errors = ErrorHandler::new();
        sc.enumerate_data_node(
            &node,
            &mut |_, class| {
                classes.push(class.map(ClassData::type_uuid));
                true
            },
            &mut |_| true,
            &mut errors,
        );
        assert_eq!(classes, [None, Some(i32::type_uuid())]);
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.depth(), 0);
    }
}
