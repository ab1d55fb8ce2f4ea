use facta::{
    Type,
    rc::{RefCounted, Release},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let domain = Type::int();
    let codomain = Type::int();
    let arrow = Type::arrow(&domain, &codomain);
    domain.release();
    codomain.release();
    println!("{arrow}");

    let curried = Type::arrow(&Type::int(), &arrow);
    arrow.release();
    println!("{}", curried.print());

    match curried.release() {
        Release::Destroyed => info!("released every constructed type"),
        other => info!("curried type still referenced: {other:?}"),
    }
}
