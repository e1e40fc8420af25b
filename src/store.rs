//! The backing store shared by every handle of one builder chain.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single heap-allocated store aliased by every handle cloned from it.
///
/// Access is closure-scoped: no borrow of the inner value outlives a call to [`Shared::with`] or
/// [`Shared::with_mut`], so handles can never hold conflicting borrows. `Shared` is neither
/// `Send` nor `Sync`; a chain belongs to one thread.
///
/// # Example
/// ```rust
/// use fieldwise::Shared;
/// let a = Shared::new(Vec::<u32>::new());
/// let b = a.clone();
/// b.with_mut(|v| v.push(1));
/// assert_eq!(a.with(|v| v.len()), 1);
/// assert!(a.ptr_eq(&b));
/// ```
pub struct Shared<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Shared<S> {
    pub fn new(value: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Runs `f` with shared access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.borrow())
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.inner.borrow_mut())
    }

    /// True if both handles alias the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles aliasing this store.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl<S: Clone> Shared<S> {
    /// Copies the current contents out of the store.
    pub fn snapshot(&self) -> S {
        self.with(S::clone)
    }
}

impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Default> Default for Shared<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for Shared<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|inner| f.debug_tuple("Shared").field(inner).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_alias_one_store() {
        let a = Shared::new(0u32);
        let b = a.clone();
        assert_eq!(a.handle_count(), 2);
        a.with_mut(|n| *n += 1);
        b.with_mut(|n| *n += 1);
        assert_eq!(b.snapshot(), 2);
        drop(b);
        assert_eq!(a.handle_count(), 1);
    }

    #[test]
    fn separate_stores_are_not_equal() {
        let a = Shared::new(1u8);
        let b = Shared::new(1u8);
        assert!(!a.ptr_eq(&b));
    }
}
