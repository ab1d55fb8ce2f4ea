use archery::RcK;
use rpds::List;
use tracing::trace;

use crate::{Error, Result};

pub type Name = ustr::Ustr;

const RED_ZONE: usize = 32 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Runs `f`, growing the stack first if the remaining space is low.
pub fn with_stack<R, F: FnOnce() -> R>(f: F) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

#[derive(Debug, Clone)]
pub struct Binding<V> {
    pub name: Name,
    pub value: V,
}

/// Immutable chain of bindings, innermost first.
///
/// Extending never copies or mutates the chain it starts from: every extension
/// shares the existing tail, so sibling scopes built from the same base see
/// only their own bindings plus the common outer ones.
pub struct Scope<V>(List<Binding<V>, RcK>);

impl<V> Clone for Scope<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Scope<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(name, value)| (name.as_str(), value)))
            .finish()
    }
}

impl<V> Default for Scope<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> Scope<V> {
    pub fn empty() -> Self {
        Self(List::new_with_ptr_kind())
    }
    pub fn extend<N: Into<Name>>(&self, name: N, value: V) -> Self {
        let name = name.into();
        trace!("binding {name} at depth {}", self.len());
        Self(self.0.push_front(Binding { name, value }))
    }
    pub fn get(&self, name: &Name) -> Option<&V> {
        self.0
            .iter()
            .find(|binding| binding.name == *name)
            .map(|binding| &binding.value)
    }
    pub fn lookup(&self, name: &Name) -> Result<&V> {
        self.get(name).ok_or_else(|| Error::unbound_variable(*name))
    }
    pub fn contains(&self, name: &Name) -> bool {
        self.get(name).is_some()
    }
    /// The chain without its innermost binding, or `None` for the empty chain.
    pub fn tail(&self) -> Option<Self> {
        self.0.drop_first().map(Self)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &V)> {
        self.0.iter().map(|binding| (&binding.name, &binding.value))
    }
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.iter().map(|(name, _)| name)
    }
}
