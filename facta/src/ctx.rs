use tracing::debug;

use crate::{Result, expr::ExprPtr, r#type::Type, utils::Scope};

/// Chain of `name : type` bindings consulted while typechecking.
pub type Context = Scope<Type>;

/// Typechecks `term` under `ctx`, leaving `ctx` untouched.
pub fn typecheck(ctx: &Context, term: &ExprPtr) -> Result<Type> {
    debug!("typechecking {term} under {} binding(s)", ctx.len());
    let ty = term.typecheck(ctx);
    if let Err(err) = &ty {
        debug!("typechecking {term} failed: {err}");
    }
    ty
}
