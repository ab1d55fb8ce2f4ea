use std::{cell::OnceCell, rc::Rc};

use tracing::trace;

use crate::{
    Context, Environment, Error, Result,
    expr::{ExprPtr, Expression},
    r#type::Type,
    utils::{Name, with_stack},
};

/// Integer literal
#[derive(Debug, Clone, Copy)]
pub struct Int(pub i64);

impl Int {
    pub fn new(value: i64) -> ExprPtr {
        Rc::new(Self(value))
    }
}

impl Expression for Int {
    fn typecheck(&self, _: &Context) -> Result<Type> {
        Ok(Type::int())
    }
    fn evaluate(&self, _: &Environment) -> Result<ExprPtr> {
        Ok(Rc::new(*self))
    }
}

impl std::fmt::Display for Int {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variable reference
#[derive(Debug, Clone, Copy)]
pub struct Var(pub Name);

impl Var {
    pub fn new<N: Into<Name>>(name: N) -> ExprPtr {
        Rc::new(Self(name.into()))
    }
}

impl Expression for Var {
    fn typecheck(&self, ctx: &Context) -> Result<Type> {
        ctx.lookup(&self.0).cloned()
    }
    fn evaluate(&self, env: &Environment) -> Result<ExprPtr> {
        env.lookup(&self.0).cloned()
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stand-in left behind while a node releases its children.
#[derive(Debug)]
struct Hole;

impl Expression for Hole {
    fn typecheck(&self, _: &Context) -> Result<Type> {
        Err(Error::internal("typechecking a released expression"))
    }
    fn evaluate(&self, _: &Environment) -> Result<ExprPtr> {
        Err(Error::internal("evaluating a released expression"))
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_")
    }
}

thread_local! {
    static HOLE: ExprPtr = Rc::new(Hole);
}

fn take(slot: &mut ExprPtr) -> ExprPtr {
    let hole = HOLE.try_with(Rc::clone).unwrap_or_else(|_| Rc::new(Hole));
    std::mem::replace(slot, hole)
}

/// Releases `children` on a stack with room to spare, so dropping a deep
/// term does not overflow.
fn release_children<const N: usize>(children: [ExprPtr; N]) {
    if children.iter().all(|child| Rc::strong_count(child) > 1) {
        return;
    }
    with_stack(|| drop(children))
}

/// Lambda expression with an annotated binder
#[derive(Debug, Clone)]
pub struct Lambda {
    pub binding: Name,
    pub ty: Type,
    pub body: ExprPtr,
}

impl Lambda {
    pub fn new<N: Into<Name>>(binding: N, ty: Type, body: ExprPtr) -> ExprPtr {
        Rc::new(Self {
            binding: binding.into(),
            ty,
            body,
        })
    }
}

fn typecheck_lambda(ctx: &Context, binding: Name, ty: &Type, body: &ExprPtr) -> Result<Type> {
    let inner = ctx.extend(binding, ty.clone());
    let body_ty = with_stack(|| body.typecheck(&inner))?;
    Ok(Type::arrow(ty, &body_ty))
}

impl Drop for Lambda {
    fn drop(&mut self) {
        release_children([take(&mut self.body)]);
    }
}

impl Expression for Lambda {
    fn typecheck(&self, ctx: &Context) -> Result<Type> {
        typecheck_lambda(ctx, self.binding, &self.ty, &self.body)
    }
    fn evaluate(&self, env: &Environment) -> Result<ExprPtr> {
        Ok(Rc::new(Closure {
            binding: self.binding,
            ty: self.ty.clone(),
            body: self.body.clone(),
            env: env.clone(),
            cached: OnceCell::new(),
        }))
    }
}

impl std::fmt::Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        with_stack(|| write!(f, "(λ{} : {} . {})", self.binding, self.ty, self.body))
    }
}

/// Function application
#[derive(Debug, Clone)]
pub struct App(pub ExprPtr, pub ExprPtr);

impl App {
    pub fn new(func: ExprPtr, arg: ExprPtr) -> ExprPtr {
        Rc::new(Self(func, arg))
    }
}

impl Drop for App {
    fn drop(&mut self) {
        release_children([take(&mut self.0), take(&mut self.1)]);
    }
}

impl Expression for App {
    fn typecheck(&self, ctx: &Context) -> Result<Type> {
        with_stack(|| {
            let func_ty = self.0.typecheck(ctx)?;
            let Some(arrow) = func_ty.as_arrow() else {
                return Err(Error::NotAFunction(func_ty));
            };
            let arg_ty = self.1.typecheck(ctx)?;
            if arg_ty != *arrow.domain() {
                return Err(Error::type_mismatch(arrow.domain().clone(), arg_ty));
            }
            Ok(arrow.codomain().clone())
        })
    }
    fn evaluate(&self, env: &Environment) -> Result<ExprPtr> {
        with_stack(|| {
            let func = self.0.evaluate(env)?;
            let arg = self.1.evaluate(env)?;
            func.apply(arg)
        })
    }
}

impl std::fmt::Display for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        with_stack(|| write!(f, "({} {})", self.0, self.1))
    }
}

/// Non-recursive let binding
#[derive(Debug, Clone)]
pub struct Let {
    pub name: Name,
    pub binding: ExprPtr,
    pub body: ExprPtr,
}

impl Let {
    pub fn new<N: Into<Name>>(name: N, binding: ExprPtr, body: ExprPtr) -> ExprPtr {
        Rc::new(Self {
            name: name.into(),
            binding,
            body,
        })
    }
}

impl Drop for Let {
    fn drop(&mut self) {
        release_children([take(&mut self.binding), take(&mut self.body)]);
    }
}

impl Expression for Let {
    fn typecheck(&self, ctx: &Context) -> Result<Type> {
        with_stack(|| {
            let bound = self.binding.typecheck(ctx)?;
            self.body.typecheck(&ctx.extend(self.name, bound))
        })
    }
    fn evaluate(&self, env: &Environment) -> Result<ExprPtr> {
        with_stack(|| {
            let bound = self.binding.evaluate(env)?;
            self.body.evaluate(&env.extend(self.name, bound))
        })
    }
}

impl std::fmt::Display for Let {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        with_stack(|| {
            write!(
                f,
                "(let {} = {} in {})",
                self.name, self.binding, self.body
            )
        })
    }
}

/// Function value: a lambda together with the environment it was built in.
#[derive(Debug, Clone)]
pub struct Closure {
    binding: Name,
    ty: Type,
    body: ExprPtr,
    env: Environment,
    cached: OnceCell<Type>,
}

impl Drop for Closure {
    fn drop(&mut self) {
        let env = std::mem::take(&mut self.env);
        let body = take(&mut self.body);
        with_stack(|| {
            drop(env);
            drop(body);
        })
    }
}

impl Expression for Closure {
    /// Captured values are closed, so the closure is checked against the types
    /// of its own environment rather than the caller's context. The result is
    /// computed once per closure.
    fn typecheck(&self, _: &Context) -> Result<Type> {
        if let Some(ty) = self.cached.get() {
            return Ok(ty.clone());
        }
        let captured = self.env.iter().collect::<Vec<_>>();
        let ctx = captured
            .into_iter()
            .rev()
            .try_fold(Context::empty(), |ctx, (name, value)| {
                let ty = value.typecheck(&Context::empty())?;
                Ok::<_, Error>(ctx.extend(*name, ty))
            })?;
        let ty = typecheck_lambda(&ctx, self.binding, &self.ty, &self.body)?;
        Ok(self.cached.get_or_init(|| ty).clone())
    }
    fn evaluate(&self, _: &Environment) -> Result<ExprPtr> {
        Ok(Rc::new(self.clone()))
    }
    fn apply(&self, argument: ExprPtr) -> Result<ExprPtr> {
        trace!("entering closure over {}", self.binding);
        let env = self.env.extend(self.binding, argument);
        with_stack(|| self.body.evaluate(&env))
    }
}

impl std::fmt::Display for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        with_stack(|| write!(f, "(λ{} : {} . {})", self.binding, self.ty, self.body))
    }
}
