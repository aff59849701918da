//! Database, table and column listings.
//!
//! Listings come back in the order the catalog returns them; use
//! [`sorted_for_display`] before showing them to a person.

use tracing::debug;

use crate::error::AthenaError;
use crate::service::CatalogService;

/// All databases in the catalog, following continuation tokens until the
/// last page.
pub async fn list_databases(catalog: &dyn CatalogService) -> Result<Vec<String>, AthenaError> {
    let mut databases = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = catalog.list_databases(next_token.as_deref()).await?;
        databases.extend(page.entries);
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    debug!(count = databases.len(), "Listed databases");
    Ok(databases)
}

/// All tables in `database`, following continuation tokens until the last page.
pub async fn list_tables(
    catalog: &dyn CatalogService,
    database: &str,
) -> Result<Vec<String>, AthenaError> {
    let mut tables = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = catalog.list_tables(database, next_token.as_deref()).await?;
        tables.extend(page.entries);
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    debug!(database = %database, count = tables.len(), "Listed tables");
    Ok(tables)
}

/// Column names of `database.table`. Single call, not paginated.
pub async fn list_columns(
    catalog: &dyn CatalogService,
    database: &str,
    table: &str,
) -> Result<Vec<String>, AthenaError> {
    catalog.table_columns(database, table).await
}

/// Alphabetically sorted copy of a listing.
pub fn sorted_for_display(entries: &[String]) -> Vec<String> {
    let mut sorted = entries.to_vec();
    sorted.sort();
    sorted
}
