//! The expression interface.
//!
//! Expressions are open: a new node kind is a new type implementing
//! [`Expression`], and nothing else in the crate needs to change. Nodes are
//! shared through [`ExprPtr`] and own their sub-expressions.
use std::rc::Rc;

use tracing::error;

use crate::{Context, Environment, Error, Result, r#type::Type};

pub type ExprPtr = Rc<dyn Expression>;

pub trait Expression: std::fmt::Display + std::fmt::Debug {
    /// Infers the type of this expression under `ctx`.
    ///
    /// Binders check their bodies under an extended copy of `ctx` and drop it
    /// afterwards; `ctx` itself is never changed.
    fn typecheck(&self, ctx: &Context) -> Result<Type>;

    /// Reduces this expression to a value under `env`.
    fn evaluate(&self, env: &Environment) -> Result<ExprPtr>;

    /// Calls this value with `argument`.
    ///
    /// Only function values support this. Reaching the default means a
    /// well-typed program applied a non-function, which typechecking must
    /// have ruled out.
    fn apply(&self, argument: ExprPtr) -> Result<ExprPtr> {
        error!("attempt to apply non-function value {self} to {argument}");
        Err(Error::internal(format!(
            "attempt to apply non-function value {self}"
        )))
    }

    fn print(&self) -> String {
        self.to_string()
    }
}
