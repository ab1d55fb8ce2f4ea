use std::rc::Rc;

use crate::{
    rc::{RefCounted, Release},
    utils::with_stack,
};

/// Semantic type.
///
/// `Int` carries no storage, so every `Int` is the same immortal instance and
/// retaining or releasing it does nothing. Arrow nodes are heap allocated and
/// shared; structurally equal arrows compare equal regardless of identity.
#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Arrow(Rc<Arrow>),
}

#[derive(Debug)]
pub struct Arrow {
    domain: Type,
    codomain: Type,
}

impl Arrow {
    pub fn domain(&self) -> &Type {
        &self.domain
    }
    pub fn codomain(&self) -> &Type {
        &self.codomain
    }
}

impl Drop for Arrow {
    fn drop(&mut self) {
        if self.domain.is_int() && self.codomain.is_int() {
            return;
        }
        with_stack(|| {
            drop(std::mem::replace(&mut self.domain, Type::Int));
            drop(std::mem::replace(&mut self.codomain, Type::Int));
        })
    }
}

impl Type {
    pub const fn int() -> Self {
        Self::Int
    }
    /// Builds `domain -> codomain`, taking its own reference to both operands.
    pub fn arrow(domain: &Type, codomain: &Type) -> Self {
        Self::Arrow(Rc::new(Arrow {
            domain: domain.retain(),
            codomain: codomain.retain(),
        }))
    }
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int)
    }
    pub fn as_arrow(&self) -> Option<&Arrow> {
        match self {
            Self::Arrow(arrow) => Some(arrow),
            Self::Int => None,
        }
    }
    pub fn print(&self) -> String {
        self.to_string()
    }
}

impl RefCounted for Type {
    fn retain(&self) -> Self {
        match self {
            Self::Int => Self::Int,
            Self::Arrow(arrow) => Self::Arrow(arrow.retain()),
        }
    }

    fn release(self) -> Release {
        match self {
            Self::Int => Release::Immortal,
            Self::Arrow(arrow) => arrow.release(),
        }
    }

    fn ref_count(&self) -> Option<usize> {
        match self {
            Self::Int => None,
            Self::Arrow(arrow) => arrow.ref_count(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int, Self::Int) => true,
            (Self::Arrow(a), Self::Arrow(b)) => {
                Rc::ptr_eq(a, b)
                    || with_stack(|| a.domain == b.domain && a.codomain == b.codomain)
            }
            _ => false,
        }
    }
}

impl Eq for Type {}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Arrow(arrow) => {
                with_stack(|| write!(f, "( {} -> {} )", arrow.domain, arrow.codomain))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::rc::Weak;

    use super::*;

    fn downgrade(ty: &Type) -> Weak<Arrow> {
        match ty {
            Type::Arrow(arrow) => Rc::downgrade(arrow),
            Type::Int => panic!("int has no heap node"),
        }
    }

    #[test]
    fn it_prints_simple_arrow() {
        let arrow = Type::arrow(&Type::int(), &Type::int());
        assert_eq!(arrow.print(), "( int -> int )");
        assert_eq!(arrow.release(), Release::Destroyed);
    }

    #[test]
    fn it_prints_nested_arrows() {
        let a = Type::arrow(&Type::int(), &Type::int());
        let b = Type::int();
        let c = Type::arrow(&a, &b);
        let nested = Type::arrow(&a, &Type::arrow(&b, &c));
        assert_eq!(
            nested.print(),
            format!("( {} -> ( {} -> {} ) )", a.print(), b.print(), c.print())
        );
        assert_eq!(
            nested.print(),
            "( ( int -> int ) -> ( int -> ( ( int -> int ) -> int ) ) )"
        );
    }

    #[test]
    fn it_treats_int_as_immortal() {
        let i1 = Type::int();
        let i2 = Type::int();
        assert_eq!(i1, i2);
        assert_eq!(i1.print(), i2.print());
        assert_eq!(i1.ref_count(), None);
        assert_eq!(i1.retain().release(), Release::Immortal);
        assert_eq!(i1.release(), Release::Immortal);
        assert_eq!(i2.release(), Release::Immortal);
        assert_eq!(Type::int().print(), "int");
    }

    #[test]
    fn it_leaves_caller_references_untouched() {
        let domain = Type::arrow(&Type::int(), &Type::int());
        let arrow = Type::arrow(&domain, &domain);
        assert_eq!(domain.ref_count(), Some(3));
        assert_eq!(domain.release(), Release::Live(2));
        assert_eq!(arrow.print(), "( ( int -> int ) -> ( int -> int ) )");
        assert_eq!(arrow.release(), Release::Destroyed);
    }

    #[test]
    fn it_compares_structurally() {
        let a = Type::arrow(&Type::int(), &Type::arrow(&Type::int(), &Type::int()));
        let b = Type::arrow(&Type::int(), &Type::arrow(&Type::int(), &Type::int()));
        let c = Type::arrow(&Type::arrow(&Type::int(), &Type::int()), &Type::int());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Type::int());
        assert_eq!(a, a.retain());
    }

    #[test]
    fn it_destroys_subtrees_recursively() {
        let codomain = Type::arrow(&Type::int(), &Type::int());
        let domain = Type::arrow(&Type::int(), &Type::int());
        let root = Type::arrow(&domain, &codomain);
        let nodes = [downgrade(&root), downgrade(&domain), downgrade(&codomain)];

        assert_eq!(domain.release(), Release::Live(1));
        assert_eq!(codomain.release(), Release::Live(1));
        assert!(nodes.iter().all(|node| node.upgrade().is_some()));

        assert_eq!(root.release(), Release::Destroyed);
        assert!(nodes.iter().all(|node| node.upgrade().is_none()));
    }

    #[test]
    fn it_keeps_shared_children_alive() {
        let shared = Type::arrow(&Type::int(), &Type::int());
        let first = Type::arrow(&shared, &Type::int());
        let second = Type::arrow(&Type::int(), &shared);
        let node = downgrade(&shared);
        drop(shared);

        assert_eq!(first.release(), Release::Destroyed);
        assert_eq!(node.strong_count(), 1);
        assert_eq!(second.print(), "( int -> ( int -> int ) )");
        assert_eq!(second.release(), Release::Destroyed);
        assert!(node.upgrade().is_none());
    }

    #[test]
    fn it_builds_prints_and_releases_nested_arrow() {
        _ = tracing_subscriber::fmt::try_init();
        let inner = Type::arrow(&Type::int(), &Type::int());
        let outer = Type::arrow(&Type::int(), &inner);
        let nodes = [downgrade(&outer), downgrade(&inner)];
        assert_eq!(inner.release(), Release::Live(1));

        assert_eq!(outer.print(), "( int -> ( int -> int ) )");
        assert_eq!(outer.ref_count(), Some(1));
        assert_eq!(outer.release(), Release::Destroyed);
        assert!(nodes.iter().all(|node| node.strong_count() == 0));
    }

    #[test]
    fn it_handles_deep_nesting() {
        let deep = (0..100_000).fold(Type::int(), |acc, _| Type::arrow(&Type::int(), &acc));
        assert!(deep.print().ends_with("int ) )"));
        assert_eq!(deep, deep.retain());
    }
}
