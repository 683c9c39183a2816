//! High-level catalog management

use crate::error::{CatalogError, Result};
use libris_core::{
    AppError, Author, Book, PhysicalBook, Publisher, Shelf, ValidationError, Validator,
};
use libris_database::{
    connection::{connect, DatabaseConfig},
    migrations::run_migrations,
    queries, search, DbPool,
};
use log::info;

/// Catalog maintenance: deduplication lookups, get-or-create helpers
/// and text search over the bibliographic records.
pub struct CatalogManager {
    pool: DbPool,
}

impl CatalogManager {
    /// Opens the catalog described by the application config,
    /// migrating the schema if needed
    pub async fn open(config: &libris_config::Config) -> Result<Self> {
        info!(
            "Opening catalog database: {}",
            config.database.path.display()
        );

        let db_config = DatabaseConfig::new(config.database.path.to_string_lossy())
            .with_max_connections(config.database.max_connections)
            .with_wal(config.database.enable_wal);

        let pool = connect(db_config).await?;
        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool (shared with other managers)
    pub fn with_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Searches books by text: exact ISBN or substring over titles,
    /// author names, author observations and collection names
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        Ok(search::search_books_by_text(&self.pool, query).await?)
    }

    /// Returns the existing author with this name or creates one.
    /// The boolean is true when a record was created.
    pub async fn get_or_create_author(&self, name: &str) -> Result<(Author, bool)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::from(ValidationError::single(
                "name",
                "Name cannot be empty",
            ))
            .into());
        }

        let (author, created) = queries::get_or_create_author(&self.pool, name).await?;
        if created {
            info!("Created author '{}'", author.name);
        }
        Ok((author, created))
    }

    /// Returns the existing publisher with this name or creates one
    pub async fn get_or_create_publisher(&self, name: &str) -> Result<(Publisher, bool)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::from(ValidationError::single(
                "name",
                "Name cannot be empty",
            ))
            .into());
        }

        let (publisher, created) = queries::get_or_create_publisher(&self.pool, name).await?;
        if created {
            info!("Created publisher '{}'", publisher.name);
        }
        Ok((publisher, created))
    }

    /// Persisted books indistinguishable from the candidate; staff
    /// tooling calls this before inserting to warn about duplicates
    pub async fn find_duplicate_books(&self, candidate: &Book) -> Result<Vec<Book>> {
        Ok(queries::find_book_equals(&self.pool, candidate).await?)
    }

    /// Persisted authors indistinguishable from the candidate
    pub async fn find_duplicate_authors(&self, candidate: &Author) -> Result<Vec<Author>> {
        Ok(queries::find_author_equals(&self.pool, candidate).await?)
    }

    /// Persisted shelves indistinguishable from the candidate
    pub async fn find_duplicate_shelves(&self, candidate: &Shelf) -> Result<Vec<Shelf>> {
        Ok(queries::find_shelf_equals(&self.pool, candidate).await?)
    }

    /// Persisted copies indistinguishable from the candidate
    pub async fn find_duplicate_copies(&self, candidate: &PhysicalBook) -> Result<Vec<PhysicalBook>> {
        Ok(queries::find_copy_equals(&self.pool, candidate).await?)
    }

    /// Suggested circulation number for the next copy form
    pub async fn next_physical_id(&self) -> Result<i64> {
        Ok(queries::next_physical_id(&self.pool).await?)
    }

    /// Registers a new physical copy after validating its fields
    pub async fn register_copy(&self, copy: &PhysicalBook) -> Result<()> {
        copy.validate().map_err(AppError::from)?;
        queries::create_copy(&self.pool, copy).await?;
        info!("Registered copy #{}", copy.physical_id);
        Ok(())
    }
}
