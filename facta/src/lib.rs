use std::{backtrace::Backtrace, borrow::Cow};

use thiserror::Error;

pub mod ctx;
pub mod eval;
pub mod expr;
pub mod rc;
pub mod term;
pub mod r#type;
pub mod utils;

pub use ctx::Context;
pub use eval::Environment;
pub use expr::{ExprPtr, Expression};
pub use r#type::Type;
pub use utils::Name;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Internal(Cow<'static, str>, Box<Backtrace>),
    #[error("variable {0} is not bound in this scope")]
    UnboundVariable(Name),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Type, found: Type },
    #[error("cannot apply a value of non-function type {0}")]
    NotAFunction(Type),
}

impl Error {
    pub fn internal<E: Into<Cow<'static, str>>>(error: E) -> Self {
        Self::Internal(error.into(), Box::new(Backtrace::capture()))
    }
    pub fn unbound_variable(name: Name) -> Self {
        Self::UnboundVariable(name)
    }
    pub fn type_mismatch(expected: Type, found: Type) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
