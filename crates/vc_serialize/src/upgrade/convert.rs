use alloc::string::ToString;
use alloc::vec::Vec;

use crate::enumerate::ErrorHandler;
use crate::tree::DataElementNode;
use crate::upgrade::{FieldUpgrade, UpgradeError, UpgradeKind};
use crate::{ClassData, SerializeContext};

impl SerializeContext {
    /// Brings `node` and its sub elements to the registered versions.
    ///
    /// Sub elements are upgraded first. Then, for this node:
    ///
    /// - a deprecated class runs its converter, or the node is dropped;
    /// - leaves and nodes at the current version are left alone;
    /// - an older node runs the class converter if there is one, otherwise
    ///   the field upgrade chain starting at the node version, after which
    ///   sub elements that match no field are removed.
    ///
    /// Returns `false` if the node must be removed from its parent.
    /// Failures are reported to `errors` and skip the faulty field.
    pub fn upgrade_node(&self, node: &mut DataElementNode, errors: &mut ErrorHandler) -> bool {
        node.children.retain_mut(|child| self.upgrade_node(child, errors));

        let Some(class) = self.find_class_data(node.type_uuid(), None, 0) else {
            return true;
        };

        if class.is_deprecated() {
            return match class.converter() {
                Some(converter) => converter(self, node),
                None => {
                    log::debug!("dropping `{}` data of deprecated class `{}`", node.name(), class.name());
                    false
                }
            };
        }

        let version = node.version();
        if class.is_leaf() || version == class.version() {
            return true;
        }
        if version > class.version() {
            let error = UpgradeError::NewerThanClass {
                class: class.name().to_string(),
                found: version,
                registered: class.version(),
            };
            errors.report_error(&error.to_string());
            return true;
        }

        if let Some(converter) = class.converter() {
            log::debug!("converting `{}` from version {version} to {}", class.name(), class.version());
            let keep = converter(self, node);
            node.element.version = class.version();
            return keep;
        }

        // (old name, new name) hashes of the renames applied so far.
        let mut renames: Vec<(u32, u32)> = Vec::new();
        for upgrade in class.upgrades().chain(version, class.version()) {
            if let Err(error) = self.apply_field_upgrade(node, upgrade, &mut renames, errors) {
                errors.report_error(&error.to_string());
            }
        }
        node.element.version = class.version();

        if class.container().is_none() {
            Self::prune_fields(node, class);
        }
        true
    }

    fn apply_field_upgrade(
        &self,
        node: &mut DataElementNode,
        upgrade: &FieldUpgrade,
        renames: &mut Vec<(u32, u32)>,
        errors: &mut ErrorHandler,
    ) -> Result<(), UpgradeError> {
        let crc = renames
            .iter()
            .fold(upgrade.field_crc(), |crc, &(from, to)| if from == crc { to } else { crc });
        let Some(field) = node.find_sub_element_mut(crc) else {
            return Ok(());
        };
        log::trace!(
            "upgrading field `{}` from version {} to {}",
            upgrade.field_name(),
            upgrade.from_version(),
            upgrade.to_version()
        );

        let (from_type, to_type, convert) = match upgrade.kind() {
            UpgradeKind::Name { new_name, .. } => {
                field.set_name(new_name.clone());
                renames.push((crc, field.name_crc()));
                return Ok(());
            }
            UpgradeKind::Type {
                from_type,
                to_type,
                convert,
            } => (*from_type, *to_type, convert),
        };

        let field_name = || upgrade.field_name().to_string();
        if field.type_uuid() != from_type {
            return Err(UpgradeError::FieldType {
                field: field_name(),
                expected: from_type,
                found: field.type_uuid(),
            });
        }

        let mut value = self.create_any(from_type).ok_or_else(|| UpgradeError::NoFactory {
            field: field_name(),
            uuid: from_type,
        })?;
        let data_type = field.data_type();
        field
            .get_data_any(self, value.as_mut(), from_type, errors)
            .map_err(|source| UpgradeError::Decode {
                field: field_name(),
                source,
            })?;

        let converted = convert(value).map_err(|_| UpgradeError::Convert { field: field_name() })?;

        let mut replacement = DataElementNode::new(field.element.name.clone());
        replacement
            .set_data_any(self, converted.as_ref(), to_type, data_type, errors)
            .map_err(|source| UpgradeError::Encode {
                field: field_name(),
                source,
            })?;
        *field = replacement;
        Ok(())
    }

    /// Removes sub elements that match no field of `class`.
    fn prune_fields(node: &mut DataElementNode, class: &ClassData) {
        node.children.retain(|child| {
            let keep = class.element(child.name_crc()).is_some();
            if !keep {
                log::debug!("`{}` no longer has field `{}`, dropped", class.name(), child.name());
            }
            keep
        });
    }
}
