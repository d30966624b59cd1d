use alloc::vec::Vec;

use crate::upgrade::FieldUpgrade;

// -----------------------------------------------------------------------------
// UpgradeTable

/// The field upgrades of one class, grouped by field.
///
/// Each field's list is ordered by `from` ascending, then `to` descending,
/// then type upgrades before name upgrades.
#[derive(Default, Clone, Debug)]
pub struct UpgradeTable {
    fields: Vec<(u32, Vec<FieldUpgrade>)>,
}

impl UpgradeTable {
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds an upgrade. Returns `false`, without adding it, if an upgrade of
    /// the same kind already covers the same field and versions.
    pub fn add(&mut self, upgrade: FieldUpgrade) -> bool {
        let list = match self.fields.iter().position(|(crc, _)| *crc == upgrade.field_crc) {
            Some(index) => &mut self.fields[index].1,
            None => {
                self.fields.push((upgrade.field_crc, Vec::new()));
                let last = self.fields.len() - 1;
                &mut self.fields[last].1
            }
        };

        if list.iter().any(|existing| existing.collides_with(&upgrade)) {
            return false;
        }

        let key = |u: &FieldUpgrade| (u.from, u32::MAX - u.to, u.kind_rank());
        let index = list.partition_point(|existing| key(existing) <= key(&upgrade));
        list.insert(index, upgrade);
        true
    }

    /// Upgrades of one field, keyed by the hash of its name at the time of
    /// the upgrade.
    pub fn field(&self, field_crc: u32) -> &[FieldUpgrade] {
        self.fields
            .iter()
            .find(|(crc, _)| *crc == field_crc)
            .map_or(&[][..], |(_, list)| list.as_slice())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of upgrades.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, list)| list.len()).sum()
    }

    /// The upgrades to apply to data saved at `node_version` to bring it to
    /// `class_version`, in application order.
    ///
    /// Per field, the chain starts at the first upgrade whose `from` is at
    /// least `node_version` and jumps as far as possible without passing
    /// `class_version`, then continues from there. The collected steps are
    /// ordered by `to`, renames first on ties.
    pub fn chain(&self, node_version: u32, class_version: u32) -> Vec<&FieldUpgrade> {
        let mut steps = Vec::new();
        for (_, list) in &self.fields {
            let mut cursor = node_version;
            while cursor < class_version {
                let Some(first) = list
                    .iter()
                    .find(|u| u.from >= cursor && u.to <= class_version)
                else {
                    break;
                };
                let (from, to) = (first.from, first.to);
                steps.extend(list.iter().filter(|u| u.from == from && u.to == to));
                cursor = to;
            }
        }
        steps.sort_by_key(|u| (u.to, u8::from(!u.is_name_upgrade())));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::UpgradeTable;
    use crate::upgrade::FieldUpgrade;
    use alloc::vec::Vec;

    fn versions(steps: &[&FieldUpgrade]) -> Vec<(u32, u32)> {
        steps.iter().map(|u| (u.from_version(), u.to_version())).collect()
    }

    #[test]
    fn rejects_duplicates() {
        let mut table = UpgradeTable::new();
        assert!(table.add(FieldUpgrade::rename("a", "b", 0, 1)));
        assert!(!table.add(FieldUpgrade::rename("a", "c", 0, 1)));
        assert!(table.add(FieldUpgrade::retype("a", 0, 1, |v: i32| v as i64)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn field_order() {
        let mut table = UpgradeTable::new();
        table.add(FieldUpgrade::rename("a", "b", 1, 2));
        table.add(FieldUpgrade::rename("a", "b", 0, 1));
        table.add(FieldUpgrade::rename("a", "b", 0, 3));
        table.add(FieldUpgrade::retype("a", 0, 3, |v: i32| v as i64));

        let list = table.field(crate::info::name_crc("a"));
        let order: Vec<(u32, u32, bool)> = list
            .iter()
            .map(|u| (u.from_version(), u.to_version(), u.is_name_upgrade()))
            .collect();
        assert_eq!(order, [(0, 3, false), (0, 3, true), (0, 1, true), (1, 2, true)]);
    }

    #[test]
    fn chain_jumps_forward() {
        let mut table = UpgradeTable::new();
        table.add(FieldUpgrade::rename("a", "b", 0, 1));
        table.add(FieldUpgrade::rename("b", "c", 1, 2));
        table.add(FieldUpgrade::rename("x", "y", 0, 2));
        table.add(FieldUpgrade::rename("x", "z", 0, 5));

        let steps = table.chain(0, 2);
        assert_eq!(versions(&steps), [(0, 1), (1, 2), (0, 2)]);
        assert!(table.chain(2, 2).is_empty());
        assert_eq!(versions(&table.chain(1, 2)), [(1, 2)]);
    }

    #[test]
    fn chain_renames_before_retypes() {
        let mut table = UpgradeTable::new();
        table.add(FieldUpgrade::retype("v", 0, 1, |v: i32| v as i64));
        table.add(FieldUpgrade::rename("w", "v2", 0, 1));

        let steps = table.chain(0, 1);
        assert!(steps[0].is_name_upgrade());
        assert!(!steps[1].is_name_upgrade());
    }
}
