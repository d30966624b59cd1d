use alloc::boxed::Box;
use core::any::Any;

// -----------------------------------------------------------------------------
// ElementAccess

/// Reaches one element (a field or a base class view) inside its owner.
///
/// Accessors replace byte offsets: they are captured when the element is
/// declared and downcast the owner to its concrete type before projecting.
/// An owner of the wrong type yields `None`.
pub trait ElementAccess: Send + Sync {
    /// The element inside `owner`, or `None` for an empty pointer.
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any>;

    /// Replaces the pointee of a pointer element. Value elements give the
    /// box back.
    #[inline]
    fn install(&self, _owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        Err(value)
    }

    /// Empties a pointer element. Returns `false` for value elements.
    #[inline]
    fn reset(&self, _owner: &mut dyn Any) -> bool {
        false
    }
}

// -----------------------------------------------------------------------------
// ValueAccess

/// Accessor of a field or base class stored by value.
pub struct ValueAccess<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> ValueAccess<T, F> {
    #[inline]
    pub const fn new(get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        Self { get, get_mut }
    }
}

impl<T: Any, F: Any> ElementAccess for ValueAccess<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner) as &dyn Any)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let owner = owner.downcast_mut::<T>()?;
        Some((self.get_mut)(owner) as &mut dyn Any)
    }
}

// -----------------------------------------------------------------------------
// BoxedAccess

/// Accessor of an owned, nullable pointer field: `Option<Box<F>>`.
pub struct BoxedAccess<T, F> {
    get: fn(&T) -> &Option<Box<F>>,
    get_mut: fn(&mut T) -> &mut Option<Box<F>>,
}

impl<T, F> BoxedAccess<T, F> {
    #[inline]
    pub const fn new(
        get: fn(&T) -> &Option<Box<F>>,
        get_mut: fn(&mut T) -> &mut Option<Box<F>>,
    ) -> Self {
        Self { get, get_mut }
    }
}

impl<T: Any, F: Any> ElementAccess for BoxedAccess<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<T>()?;
        let pointee: &F = (self.get)(owner).as_deref()?;
        Some(pointee as &dyn Any)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let owner = owner.downcast_mut::<T>()?;
        let pointee: &mut F = (self.get_mut)(owner).as_deref_mut()?;
        Some(pointee as &mut dyn Any)
    }

    fn install(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        let Some(owner) = owner.downcast_mut::<T>() else {
            return Err(value);
        };
        *(self.get_mut)(owner) = Some(value.downcast::<F>()?);
        Ok(())
    }

    fn reset(&self, owner: &mut dyn Any) -> bool {
        owner
            .downcast_mut::<T>()
            .map(|owner| *(self.get_mut)(owner) = None)
            .is_some()
    }
}

// -----------------------------------------------------------------------------
// DynAccess

/// Accessor of a polymorphic pointer field: `Option<Box<dyn Any>>`.
///
/// The pointee's class is resolved from its native type at traversal time.
pub struct DynAccess<T> {
    get: fn(&T) -> &Option<Box<dyn Any>>,
    get_mut: fn(&mut T) -> &mut Option<Box<dyn Any>>,
}

impl<T> DynAccess<T> {
    #[inline]
    pub const fn new(
        get: fn(&T) -> &Option<Box<dyn Any>>,
        get_mut: fn(&mut T) -> &mut Option<Box<dyn Any>>,
    ) -> Self {
        Self { get, get_mut }
    }
}

impl<T: Any> ElementAccess for DynAccess<T> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<T>()?;
        (self.get)(owner).as_deref()
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let owner = owner.downcast_mut::<T>()?;
        (self.get_mut)(owner)
            .as_deref_mut()
            .map(|pointee| pointee as &mut dyn Any)
    }

    fn install(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        let Some(owner) = owner.downcast_mut::<T>() else {
            return Err(value);
        };
        *(self.get_mut)(owner) = Some(value);
        Ok(())
    }

    fn reset(&self, owner: &mut dyn Any) -> bool {
        owner
            .downcast_mut::<T>()
            .map(|owner| *(self.get_mut)(owner) = None)
            .is_some()
    }
}
