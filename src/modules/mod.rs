pub mod auth;
pub mod books;
pub mod info;

use std::sync::Arc;

use bookshelf_authz::TokenService;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

use auth::credentials::CredentialTable;
use books::store::BookStore;

/// Shared state handed to the modules at construction
pub struct Services {
    pub credentials: Arc<CredentialTable>,
    pub tokens: Arc<TokenService>,
    pub books: Arc<BookStore>,
}

impl Services {
    /// Built-in accounts, a token service keyed from settings, and the seeded catalogue
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            credentials: Arc::new(CredentialTable::builtin()),
            tokens: Arc::new(TokenService::from_settings(&settings.auth)?),
            books: Arc::new(BookStore::seeded()),
        })
    }
}

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) -> anyhow::Result<()> {
    registry.register(Arc::new(info::InfoModule::new()))?;
    registry.register(Arc::new(auth::AuthModule::new(
        services.credentials.clone(),
        services.tokens.clone(),
    )))?;
    registry.register(Arc::new(books::BooksModule::new(
        services.books.clone(),
        services.tokens.clone(),
    )))?;
    Ok(())
}
