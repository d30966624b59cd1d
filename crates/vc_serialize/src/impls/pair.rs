use alloc::borrow::Cow;
use alloc::format;

use crate::SerializeContext;
use crate::info::{TypeInfo, TypeUuid};

const PAIR_TEMPLATE: TypeUuid = TypeUuid::from_u128(0x919645c1_e464_482b_a69b_04aa688b6847);

/// A pair is a class of two fields, `value1` and `value2`. Map containers
/// store their entries as pairs.
impl<A, B> TypeInfo for (A, B)
where
    A: TypeInfo + Default,
    B: TypeInfo + Default,
{
    fn type_uuid() -> TypeUuid {
        PAIR_TEMPLATE.specialize(&[A::type_uuid(), B::type_uuid()])
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("({}, {})", A::type_name(), B::type_name()))
    }

    fn reflect_generic(sc: &mut SerializeContext) {
        sc.generic_class::<Self>(PAIR_TEMPLATE, &[A::type_uuid(), B::type_uuid()])
            .field("value1", |p: &Self| &p.0, |p: &mut Self| &mut p.0)
            .field("value2", |p: &Self| &p.1, |p: &mut Self| &mut p.1);
    }
}
