//! Bookshelf application library
//!
//! Wires the info, auth and books modules into the kernel registry and runs
//! the HTTP service.

pub mod modules;

pub use modules::*;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry holding every application module, built over `services`
pub fn build_registry(services: &Services) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, services)?;
    Ok(registry)
}

/// The complete HTTP application without binding a listener
pub fn build_app(settings: &Settings, services: &Services) -> anyhow::Result<Router> {
    let registry = build_registry(services)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}

/// Run the service until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let services = Services::from_settings(&settings).context("invalid auth settings")?;
    let registry = build_registry(&services)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_modules(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_modules(&ctx)
        .await
        .context("module start failed")?;

    let served =
        bookshelf_http::start_server(&registry, &settings, bookshelf_http::shutdown_signal()).await;

    registry
        .stop_modules()
        .await
        .context("module shutdown failed")?;

    served
}
