use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::info::{TypeInfo, TypeUuid, name_crc};

// -----------------------------------------------------------------------------
// FieldUpgrade

/// Type erased conversion of a type upgrade. Gives the value back if it is
/// not of the expected source type.
pub type ConvertFn = Arc<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, Box<dyn Any>> + Send + Sync>;

/// What a [`FieldUpgrade`] does to its field.
#[derive(Clone)]
pub enum UpgradeKind {
    /// Decodes the field as `from_type`, converts it and stores it back as
    /// `to_type` under the same name.
    Type {
        from_type: TypeUuid,
        to_type: TypeUuid,
        convert: ConvertFn,
    },
    /// Renames the field, keeping its data.
    Name {
        new_name: Cow<'static, str>,
        new_crc: u32,
    },
}

/// One step of a field's upgrade chain, from `from` to `to`.
#[derive(Clone)]
pub struct FieldUpgrade {
    pub(crate) field_name: Cow<'static, str>,
    pub(crate) field_crc: u32,
    pub(crate) from: u32,
    pub(crate) to: u32,
    pub(crate) kind: UpgradeKind,
}

impl FieldUpgrade {
    /// Renames `old_name` to `new_name`.
    pub fn rename(
        old_name: impl Into<Cow<'static, str>>,
        new_name: impl Into<Cow<'static, str>>,
        from: u32,
        to: u32,
    ) -> Self {
        let field_name = old_name.into();
        let new_name = new_name.into();
        Self {
            field_crc: name_crc(&field_name),
            field_name,
            from,
            to,
            kind: UpgradeKind::Name {
                new_crc: name_crc(&new_name),
                new_name,
            },
        }
    }

    /// Converts `field` from `A` to `B` with `convert`.
    pub fn retype<A: TypeInfo, B: TypeInfo>(
        field: impl Into<Cow<'static, str>>,
        from: u32,
        to: u32,
        convert: fn(A) -> B,
    ) -> Self {
        let field_name = field.into();
        let convert: ConvertFn = Arc::new(
            move |value: Box<dyn Any>| -> Result<Box<dyn Any>, Box<dyn Any>> {
                let value = value.downcast::<A>()?;
                Ok(Box::new(convert(*value)))
            },
        );
        Self {
            field_crc: name_crc(&field_name),
            field_name,
            from,
            to,
            kind: UpgradeKind::Type {
                from_type: A::type_uuid(),
                to_type: B::type_uuid(),
                convert,
            },
        }
    }

    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    #[inline]
    pub fn field_crc(&self) -> u32 {
        self.field_crc
    }

    #[inline]
    pub fn from_version(&self) -> u32 {
        self.from
    }

    #[inline]
    pub fn to_version(&self) -> u32 {
        self.to
    }

    #[inline]
    pub fn kind(&self) -> &UpgradeKind {
        &self.kind
    }

    #[inline]
    pub fn is_name_upgrade(&self) -> bool {
        matches!(self.kind, UpgradeKind::Name { .. })
    }

    // Type upgrades sort before name upgrades sharing the same versions.
    #[inline]
    pub(crate) fn kind_rank(&self) -> u8 {
        match self.kind {
            UpgradeKind::Type { .. } => 0,
            UpgradeKind::Name { .. } => 1,
        }
    }

    /// Same field, same kind, same versions.
    #[inline]
    pub(crate) fn collides_with(&self, other: &Self) -> bool {
        self.field_crc == other.field_crc
            && self.from == other.from
            && self.to == other.to
            && self.kind_rank() == other.kind_rank()
    }
}

impl fmt::Debug for FieldUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FieldUpgrade");
        s.field("field", &self.field_name)
            .field("from", &self.from)
            .field("to", &self.to);
        match &self.kind {
            UpgradeKind::Type {
                from_type, to_type, ..
            } => s.field("from_type", from_type).field("to_type", to_type),
            UpgradeKind::Name { new_name, .. } => s.field("new_name", new_name),
        };
        s.finish()
    }
}
