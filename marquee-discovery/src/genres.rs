//! Genre id to name lookup.

use std::collections::HashMap;

use marquee_catalog::{CatalogClient, CatalogError, Genre};
use parking_lot::RwLock;

/// Genre names keyed by id, filled once per session.
#[derive(Debug, Default)]
pub struct GenreTable {
    names: RwLock<HashMap<u64, String>>,
}

impl GenreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_genres(genres: impl IntoIterator<Item = Genre>) -> Self {
        let table = Self::new();
        table.replace(genres);
        table
    }

    /// Fetches the genre list and replaces the table contents.
    ///
    /// Returns the number of genres loaded. On failure the table is left
    /// untouched.
    ///
    /// # Errors
    /// - `CatalogError` - The genre listing could not be fetched
    pub async fn load(&self, catalog: &dyn CatalogClient) -> Result<usize, CatalogError> {
        let genres = catalog.list_genres().await?;
        let count = genres.len();
        self.replace(genres);
        tracing::debug!(count, "Genre table loaded");
        Ok(count)
    }

    fn replace(&self, genres: impl IntoIterator<Item = Genre>) {
        let names: HashMap<u64, String> = genres.into_iter().map(|g| (g.id, g.name)).collect();
        *self.names.write() = names;
    }

    pub fn name_of(&self, id: u64) -> Option<String> {
        self.names.read().get(&id).cloned()
    }

    /// Names for `ids` in input order, skipping ids the table does not know.
    pub fn resolve(&self, ids: &[u64]) -> Vec<String> {
        let names = self.names.read();
        ids.iter().filter_map(|id| names.get(id).cloned()).collect()
    }

    /// All genres sorted by name.
    pub fn entries(&self) -> Vec<Genre> {
        let mut genres: Vec<Genre> = self
            .names
            .read()
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.clone(),
            })
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        genres
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use marquee_catalog::{DemoCatalog, ScriptedCatalog, ScriptedFailure};

    use super::*;

    #[test]
    fn test_resolve_drops_unknown_ids() {
        let table = GenreTable::from_genres(vec![
            Genre {
                id: 18,
                name: "Drama".to_string(),
            },
            Genre {
                id: 80,
                name: "Crime".to_string(),
            },
        ]);

        assert_eq!(table.resolve(&[80, 10770, 18]), vec!["Crime", "Drama"]);
        assert!(table.resolve(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_load_from_catalog() {
        let table = GenreTable::new();
        let count = table.load(&DemoCatalog::new()).await.unwrap();

        assert_eq!(count, table.len());
        assert_eq!(table.name_of(878).as_deref(), Some("Science Fiction"));
        assert_eq!(table.entries()[0].name, "Action");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_table() {
        let catalog = ScriptedCatalog::new();
        let table = GenreTable::new();
        table.load(&catalog).await.unwrap();

        catalog.fail_genres(ScriptedFailure::Status(500));
        assert!(table.load(&catalog).await.is_err());
        assert_eq!(table.name_of(28).as_deref(), Some("Action"));
    }
}
