//! Reference-counted lifecycle shared by every heap entity.
//!
//! Retaining is cloning a handle and releasing is giving one up by value, so a
//! released handle can never be touched again. Destruction happens exactly once,
//! when the last handle is released.

use std::rc::Rc;

use tracing::trace;

/// Outcome of giving up one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Other owners remain; carries how many.
    Live(usize),
    /// This was the last reference and the object has been destroyed.
    Destroyed,
    /// The object has static lifetime and is never destroyed.
    Immortal,
}

pub trait RefCounted: Sized {
    /// Acquires one more reference to the same object.
    fn retain(&self) -> Self;
    /// Gives up this reference, destroying the object if it was the last one.
    fn release(self) -> Release;
    /// Number of live references, or `None` for immortal objects.
    fn ref_count(&self) -> Option<usize>;
}

impl<T: ?Sized> RefCounted for Rc<T> {
    fn retain(&self) -> Self {
        Rc::clone(self)
    }

    fn release(self) -> Release {
        let remaining = Rc::strong_count(&self) - 1;
        let ptr = Rc::as_ptr(&self).cast::<()>();
        drop(self);
        if remaining == 0 {
            trace!("destroyed {ptr:?}");
            Release::Destroyed
        } else {
            Release::Live(remaining)
        }
    }

    fn ref_count(&self) -> Option<usize> {
        Some(Rc::strong_count(self))
    }
}
