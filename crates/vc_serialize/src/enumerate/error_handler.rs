use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::info::TypeUuid;

// -----------------------------------------------------------------------------
// DbgStackEntry

/// One level of the path being walked, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbgStackEntry {
    pub type_uuid: TypeUuid,
    pub class_name: Option<Cow<'static, str>>,
    pub element_name: Option<Cow<'static, str>>,
}

impl DbgStackEntry {
    #[inline]
    pub fn new(type_uuid: TypeUuid) -> Self {
        Self {
            type_uuid,
            class_name: None,
            element_name: None,
        }
    }

    #[inline]
    pub fn with_class(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    #[inline]
    pub fn with_element(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.element_name = Some(name.into());
        self
    }
}

// -----------------------------------------------------------------------------
// ErrorHandler

/// Accumulates the errors of a walk instead of aborting it.
///
/// Every report is logged with the path walked so far; the walk goes on
/// with the next sibling. Callers decide whether a non-zero
/// [`error_count`](Self::error_count) makes the whole operation a failure.
///
/// The path is only recorded with the `debug` feature.
#[derive(Debug, Default)]
pub struct ErrorHandler {
    errors: u32,
    warnings: u32,
    stack: Vec<DbgStackEntry>,
}

impl ErrorHandler {
    #[inline]
    pub const fn new() -> Self {
        Self {
            errors: 0,
            warnings: 0,
            stack: Vec::new(),
        }
    }

    pub fn report_error(&mut self, message: &str) {
        self.errors += 1;
        log::error!("{message}{}", self.stack_description());
    }

    pub fn report_warning(&mut self, message: &str) {
        self.warnings += 1;
        log::warn!("{message}{}", self.stack_description());
    }

    #[inline]
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    #[inline]
    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[inline]
    pub fn push(&mut self, entry: DbgStackEntry) {
        if cfg!(feature = "debug") {
            self.stack.push(entry);
        }
    }

    #[inline]
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Depth of the recorded path.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The recorded path, one line per level, outermost first. Empty when
    /// no path is recorded.
    pub fn stack_description(&self) -> String {
        if self.stack.is_empty() {
            return String::new();
        }
        let mut text = String::from("\n=== Serialize stack ===\n");
        for (depth, entry) in self.stack.iter().enumerate() {
            let _ = write!(text, "[{depth}] ");
            if let Some(element) = &entry.element_name {
                let _ = write!(text, "{element} ");
            }
            let _ = match &entry.class_name {
                Some(class) => writeln!(text, "({class} - {})", entry.type_uuid),
                None => writeln!(text, "({})", entry.type_uuid),
            };
        }
        text
    }

    /// Clears counts and path.
    pub fn reset(&mut self) {
        self.errors = 0;
        self.warnings = 0;
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        let mut handler = ErrorHandler::new();
        handler.report_error("bad");
        handler.report_warning("odd");
        handler.report_warning("odd");
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 2);

        handler.reset();
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 0);
    }

    #[cfg(feature = "debug")]
    #[test]
    fn stack_description() {
        let mut handler = ErrorHandler::new();
        assert_eq!(handler.stack_description(), "");

        handler.push(DbgStackEntry::new(TypeUuid::from_u128(1)).with_class("Outer"));
        handler.push(
            DbgStackEntry::new(TypeUuid::from_u128(2))
                .with_class("Inner")
                .with_element("field"),
        );
        let text = handler.stack_description();
        assert!(text.starts_with("\n=== Serialize stack ===\n"));
        assert!(text.contains("[0] (Outer - "));
        assert!(text.contains("[1] field (Inner - "));

        handler.pop();
        assert_eq!(handler.depth(), 1);
    }
}
