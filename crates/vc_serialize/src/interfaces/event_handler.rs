use core::any::Any;

// -----------------------------------------------------------------------------
// EventHandler

/// Lifecycle hooks of a class.
///
/// "Read" means the object is being read from (it is the source of a save
/// or a clone); "write" means it is being written to (a load). The read
/// hooks only get shared access; handlers that need to mutate state use
/// interior mutability.
pub trait EventHandler: Send + Sync {
    #[inline]
    fn on_read_begin(&self, _instance: &dyn Any) {}

    #[inline]
    fn on_read_end(&self, _instance: &dyn Any) {}

    #[inline]
    fn on_write_begin(&self, _instance: &mut dyn Any) {}

    #[inline]
    fn on_write_end(&self, _instance: &mut dyn Any) {}

    /// Fired once per object after a whole stream was loaded.
    #[inline]
    fn on_loaded_from_object_stream(&self, _instance: &mut dyn Any) {}

    /// Fired once per object of a freshly cloned graph.
    #[inline]
    fn on_object_cloned(&self, _instance: &mut dyn Any) {}
}
