use alloc::vec::Vec;

use crate::info::TypeUuid;

// -----------------------------------------------------------------------------
// GenericClassInfo

/// Bookkeeping of one generic instantiation, such as `Vec<i32>`.
///
/// The class itself lives in the registry like any other; this record links
/// it to its template and counts the declarations that asked for it. The
/// class is removed when the last one releases it.
#[derive(Debug, Clone)]
pub struct GenericClassInfo {
    pub(crate) generic: TypeUuid,
    pub(crate) specialized: TypeUuid,
    pub(crate) arguments: Vec<TypeUuid>,
    pub(crate) ref_count: usize,
}

impl GenericClassInfo {
    /// Id of the template, shared by every instantiation.
    #[inline]
    pub fn generic_type_id(&self) -> TypeUuid {
        self.generic
    }

    /// Id of this instantiation, which is also its class id.
    #[inline]
    pub fn specialized_type_id(&self) -> TypeUuid {
        self.specialized
    }

    #[inline]
    pub fn template_arguments(&self) -> &[TypeUuid] {
        &self.arguments
    }

    #[inline]
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Whether data recorded with `uuid` can be loaded as this class.
    #[inline]
    pub fn can_store(&self, uuid: TypeUuid) -> bool {
        uuid == self.specialized || uuid == self.generic
    }
}
