use tracing::debug;

use crate::{Result, expr::ExprPtr, utils::Scope};

/// Chain of `name = value` bindings consulted while evaluating.
pub type Environment = Scope<ExprPtr>;

/// Evaluates `term` under `env`, leaving `env` untouched.
pub fn evaluate(env: &Environment, term: &ExprPtr) -> Result<ExprPtr> {
    debug!("evaluating {term} under {} binding(s)", env.len());
    term.evaluate(env)
}
