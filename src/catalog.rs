use tracing::{debug, info, warn};

use crate::{
    entities::{category, movie},
    error::{CatalogError, CatalogResult},
    models::{MovieFilter, MovieWithCategory, Page},
    storage::FileArea,
    store::MovieStore,
    validation::{self, MovieForm, Upload, ValidMovie},
};

/// Movie records plus their cover images.
///
/// Row and file operations are separate steps with no transaction around
/// them: a failure between the two leaves an orphaned file or a dangling
/// `foto_sampul` reference.
#[derive(Clone)]
pub struct MovieCatalog {
    store: MovieStore,
    files: FileArea,
}

impl MovieCatalog {
    pub fn new(store: MovieStore, files: FileArea) -> Self {
        Self { store, files }
    }

    pub fn files(&self) -> &FileArea {
        &self.files
    }

    pub async fn list(
        &self,
        filter: &MovieFilter,
        page: u64,
        per_page: u64,
    ) -> CatalogResult<Page<MovieWithCategory>> {
        debug!(search = ?filter.search, page, per_page, "listing movies");
        self.store.list(filter, page, per_page).await
    }

    pub async fn get(&self, id: i32) -> CatalogResult<MovieWithCategory> {
        self.store.find_with_category(id).await?.ok_or(CatalogError::NotFound(id))
    }

    pub async fn categories(&self) -> CatalogResult<Vec<category::Model>> {
        self.store.categories().await
    }

    pub async fn create(&self, form: &MovieForm, upload: Option<Upload>) -> CatalogResult<movie::Model> {
        let ValidMovie { fields, cover } = self.validate(form, upload).await?;

        let foto_sampul = match cover {
            Some(cover) => self.files.store(&cover.bytes, &cover.extension).await?,
            None => String::new(),
        };

        let created = self.store.insert(&fields, foto_sampul).await?;
        info!(id = created.id, judul = %created.judul, "movie created");
        Ok(created)
    }

    /// Replaces the movie's fields. A new cover replaces the old file; without
    /// one the current `foto_sampul` stays.
    pub async fn update(
        &self,
        id: i32,
        form: &MovieForm,
        upload: Option<Upload>,
    ) -> CatalogResult<movie::Model> {
        let existing = self.store.find(id).await?.ok_or(CatalogError::NotFound(id))?;
        let ValidMovie { fields, cover } = self.validate(form, upload).await?;

        let foto_sampul = match cover {
            Some(cover) => {
                let name = self.files.store(&cover.bytes, &cover.extension).await?;
                if existing.has_cover() {
                    self.release(&existing.foto_sampul).await;
                }
                Some(name)
            },
            None => None,
        };

        let updated = self.store.update(id, &fields, foto_sampul).await?;
        info!(id, judul = %updated.judul, "movie updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        let existing = self.store.find(id).await?.ok_or(CatalogError::NotFound(id))?;

        if existing.has_cover() {
            self.files.delete_if_exists(&existing.foto_sampul).await?;
        }

        self.store.delete(id).await?;
        info!(id, "movie deleted");
        Ok(())
    }

    async fn validate(&self, form: &MovieForm, upload: Option<Upload>) -> CatalogResult<ValidMovie> {
        let category_known = match form.category_id() {
            Some(category_id) => self.store.category_exists(category_id).await?,
            None => false,
        };

        validation::validate(form, upload, category_known).map_err(CatalogError::Validation)
    }

    async fn release(&self, name: &str) {
        if let Err(err) = self.files.delete_if_exists(name).await {
            warn!(file = %name, error = %err, "failed to delete replaced cover image");
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::validation::tests::{JPEG_BYTES, PNG_BYTES, inception};

    async fn catalog() -> (TempDir, MovieCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
        let db = crate::db::connect_and_migrate(&url).await.unwrap();
        let catalog = MovieCatalog::new(MovieStore::new(db), FileArea::new(dir.path().join("images")));
        (dir, catalog)
    }

    fn photo(name: &str, bytes: &'static [u8]) -> Option<Upload> {
        Some(Upload { file_name: name.to_string(), bytes: Bytes::from_static(bytes) })
    }

    fn titled(judul: &str, sinopsis: &str) -> MovieForm {
        MovieForm { judul: judul.to_string(), sinopsis: sinopsis.to_string(), ..inception() }
    }

    #[tokio::test]
    async fn create_without_image_leaves_cover_empty() {
        let (_dir, catalog) = catalog().await;

        let movie = catalog.create(&inception(), None).await.unwrap();
        assert_eq!(movie.judul, "Inception");
        assert_eq!(movie.tahun, 2010);
        assert_eq!(movie.foto_sampul, "");

        let found = catalog.get(movie.id).await.unwrap();
        assert_eq!(found.movie, movie);
        assert_eq!(found.category.unwrap().id, 1);
    }

    #[tokio::test]
    async fn create_with_image_stores_the_file() {
        let (_dir, catalog) = catalog().await;

        let movie = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();
        assert!(movie.foto_sampul.ends_with(".png"));
        assert_ne!(movie.foto_sampul, "cover.png");

        let path = catalog.files().path_of(&movie.foto_sampul).unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let (_dir, catalog) = catalog().await;

        let mut form = inception();
        form.category_id = "999".to_string();
        form.tahun = String::new();

        let err = catalog.create(&form, photo("cover.png", PNG_BYTES)).await.unwrap_err();
        let errors = match err {
            CatalogError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["category_id", "tahun"]);

        let page = catalog.list(&MovieFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
        let mut entries = tokio::fs::read_dir(catalog.files().root()).await.ok();
        if let Some(entries) = entries.as_mut() {
            assert!(entries.next_entry().await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let (_dir, catalog) = catalog().await;
        for n in 1..=7 {
            catalog.create(&titled(&format!("Movie {n}"), "plot"), None).await.unwrap();
        }

        let first = catalog.list(&MovieFilter::default(), 1, 6).await.unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.last_page, 2);
        assert_eq!(first.items.len(), 6);
        assert_eq!(first.items[0].movie.judul, "Movie 7");
        assert!(first.has_next());

        let second = catalog.list(&MovieFilter::default(), 2, 6).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].movie.judul, "Movie 1");

        let beyond = catalog.list(&MovieFilter::default(), 5, 6).await.unwrap();
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn search_matches_title_or_synopsis_ignoring_case() {
        let (_dir, catalog) = catalog().await;
        catalog.create(&titled("Inception", "Dream heist"), None).await.unwrap();
        catalog.create(&titled("Interstellar", "Space travel"), None).await.unwrap();
        catalog.create(&titled("Paprika", "A DREAM therapist"), None).await.unwrap();

        let page = catalog.list(&MovieFilter::search(Some("dream")), 1, 6).await.unwrap();
        let mut titles: Vec<_> = page.items.iter().map(|m| m.movie.judul.as_str()).collect();
        titles.sort();
        assert_eq!(titles, ["Inception", "Paprika"]);

        let page = catalog.list(&MovieFilter::search(Some("INTER")), 1, 6).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].category_name(), "Action");

        let none = catalog.list(&MovieFilter::search(Some("zombie")), 1, 6).await.unwrap();
        assert!(none.items.is_empty());
        assert_eq!(none.total, 0);

        let wildcard = catalog.list(&MovieFilter::search(Some("%")), 1, 6).await.unwrap();
        assert!(wildcard.items.is_empty());
    }

    #[tokio::test]
    async fn update_without_image_keeps_cover() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();

        let mut form = inception();
        form.judul = "Inception (2010)".to_string();
        let updated = catalog.update(movie.id, &form, None).await.unwrap();

        assert_eq!(updated.judul, "Inception (2010)");
        assert_eq!(updated.foto_sampul, movie.foto_sampul);
        assert!(catalog.files().exists(&movie.foto_sampul).await);
    }

    #[tokio::test]
    async fn update_with_image_replaces_the_old_file() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), None).await.unwrap();
        assert_eq!(movie.foto_sampul, "");

        let first = catalog.update(movie.id, &inception(), photo("photo.jpg", JPEG_BYTES)).await.unwrap();
        let (stem, ext) = first.foto_sampul.rsplit_once('.').unwrap();
        assert_eq!(ext, "jpg");
        assert!(uuid::Uuid::parse_str(stem).is_ok());
        let path = catalog.files().path_of(&first.foto_sampul).unwrap();
        assert_eq!(tokio::fs::read(path).await.unwrap(), JPEG_BYTES);

        let second = catalog.update(movie.id, &inception(), photo("new.png", PNG_BYTES)).await.unwrap();
        assert_ne!(second.foto_sampul, first.foto_sampul);
        assert!(catalog.files().exists(&second.foto_sampul).await);
        assert!(!catalog.files().exists(&first.foto_sampul).await);
        assert_eq!(catalog.get(movie.id).await.unwrap().movie.foto_sampul, second.foto_sampul);
    }

    #[tokio::test]
    async fn update_tolerates_an_already_missing_old_file() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();
        catalog.files().delete(&movie.foto_sampul).await.unwrap();

        let updated = catalog.update(movie.id, &inception(), photo("cover.gif", b"GIF89a\x01\x00")).await.unwrap();
        assert!(updated.foto_sampul.ends_with(".gif"));
        assert!(catalog.files().exists(&updated.foto_sampul).await);
    }

    #[tokio::test]
    async fn invalid_update_changes_nothing() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), None).await.unwrap();

        let mut form = inception();
        form.judul = String::new();
        let err = catalog.update(movie.id, &form, photo("cover.png", PNG_BYTES)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.get(movie.id).await.unwrap().movie, movie);
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();

        catalog.delete(movie.id).await.unwrap();

        assert!(matches!(catalog.get(movie.id).await, Err(CatalogError::NotFound(_))));
        assert!(!catalog.files().exists(&movie.foto_sampul).await);
    }

    #[tokio::test]
    async fn delete_without_cover_only_removes_row() {
        let (_dir, catalog) = catalog().await;
        let keep = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();
        let movie = catalog.create(&titled("Memento", "Short-term memory loss"), None).await.unwrap();

        catalog.delete(movie.id).await.unwrap();

        assert!(matches!(catalog.get(movie.id).await, Err(CatalogError::NotFound(_))));
        assert!(catalog.files().exists(&keep.foto_sampul).await);
    }

    #[tokio::test]
    async fn failed_cover_removal_keeps_the_row() {
        let (_dir, catalog) = catalog().await;
        let movie = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap();

        // A non-empty directory under the cover's name cannot be removed as a file.
        let path = catalog.files().path_of(&movie.foto_sampul).unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();
        tokio::fs::write(path.join("keep"), b"x").await.unwrap();

        let err = catalog.delete(movie.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)), "got {err:?}");
        assert_eq!(catalog.get(movie.id).await.unwrap().movie, movie);
    }

    #[tokio::test]
    async fn unwritable_image_dir_fails_create_without_a_row() {
        let (dir, catalog) = catalog().await;
        tokio::fs::write(dir.path().join("images"), b"not a directory").await.unwrap();

        let err = catalog.create(&inception(), photo("cover.png", PNG_BYTES)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)), "got {err:?}");

        let page = catalog.list(&MovieFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn pages_far_past_the_end_are_empty() {
        let (_dir, catalog) = catalog().await;
        catalog.create(&inception(), None).await.unwrap();

        for page in [u64::MAX, i64::MAX as u64] {
            let listed = catalog.list(&MovieFilter::default(), page, 6).await.unwrap();
            assert!(listed.items.is_empty());
            assert_eq!(listed.total, 1);
            assert_eq!(listed.page, page);
        }
    }

    #[tokio::test]
    async fn missing_ids_are_not_found_everywhere() {
        let (_dir, catalog) = catalog().await;

        assert!(matches!(catalog.get(42).await, Err(CatalogError::NotFound(42))));
        assert!(matches!(catalog.update(42, &inception(), None).await, Err(CatalogError::NotFound(42))));
        assert!(matches!(catalog.delete(42).await, Err(CatalogError::NotFound(42))));
    }

    #[tokio::test]
    async fn categories_are_seeded() {
        let (_dir, catalog) = catalog().await;
        let names: Vec<_> = catalog.categories().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Action", "Comedy", "Drama", "Horror", "Romance", "Sci-Fi"]);
    }
}
