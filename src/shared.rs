//! Shared handle to a raw data container.
//!
//! Adapters never deep-copy the container they are built over. They hold a
//! [`Shared`] handle instead, so a caller, a table view and a record view can all
//! observe the same container. Identity of a container is the identity of its
//! handle ([`Shared::ptr_eq`]).

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Single-threaded shared, mutable raw container.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Immutably borrow the container.
    ///
    /// # Panics
    /// Panics if the container is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the container.
    ///
    /// # Panics
    /// Panics if the container is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// `true` when both handles point at the same container.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Replace the contents in place, keeping the container identity.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the current contents out of the container.
    pub fn snapshot(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.0.borrow()).finish()
    }
}
