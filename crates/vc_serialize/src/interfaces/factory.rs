use alloc::boxed::Box;
use core::any::Any;
use core::marker::PhantomData;

// -----------------------------------------------------------------------------
// ObjectFactory

/// Creates instances of a registered class.
///
/// Destruction is the drop of the returned box.
pub trait ObjectFactory: Send + Sync {
    /// Returns a new default instance, or `None` for abstract classes.
    fn create(&self) -> Option<Box<dyn Any>>;
}

/// Factory of `T::default()`.
pub struct DefaultFactory<T>(PhantomData<fn() -> T>);

impl<T> DefaultFactory<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DefaultFactory<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Any> ObjectFactory for DefaultFactory<T> {
    #[inline]
    fn create(&self) -> Option<Box<dyn Any>> {
        Some(Box::new(T::default()))
    }
}
