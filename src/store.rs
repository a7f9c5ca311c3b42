use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ItemsAndPagesNumber,
    PaginatorTrait, QueryFilter, QueryOrder, Set, sea_query::LikeExpr,
};

use crate::{
    entities::{category, movie},
    error::{CatalogError, CatalogResult},
    models::{MovieFilter, MovieWithCategory, Page},
    validation::MovieFields,
};

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find(&self, id: i32) -> CatalogResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_with_category(&self, id: i32) -> CatalogResult<Option<MovieWithCategory>> {
        let row = movie::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&self.db)
            .await?;
        Ok(row.map(|(movie, category)| MovieWithCategory { movie, category }))
    }

    pub async fn insert(&self, fields: &MovieFields, foto_sampul: String) -> CatalogResult<movie::Model> {
        let now = now_sec();
        let model = movie::ActiveModel {
            id: Default::default(),
            judul: Set(fields.judul.clone()),
            category_id: Set(fields.category_id),
            sinopsis: Set(fields.sinopsis.clone()),
            tahun: Set(fields.tahun),
            pemain: Set(fields.pemain.clone()),
            foto_sampul: Set(foto_sampul),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Overwrites the editable fields. `foto_sampul` is only touched when a
    /// new name is given.
    pub async fn update(
        &self,
        id: i32,
        fields: &MovieFields,
        foto_sampul: Option<String>,
    ) -> CatalogResult<movie::Model> {
        let existing = self.find(id).await?.ok_or(CatalogError::NotFound(id))?;

        let mut model: movie::ActiveModel = existing.into();
        model.judul = Set(fields.judul.clone());
        model.category_id = Set(fields.category_id);
        model.sinopsis = Set(fields.sinopsis.clone());
        model.tahun = Set(fields.tahun);
        model.pemain = Set(fields.pemain.clone());
        if let Some(name) = foto_sampul {
            model.foto_sampul = Set(name);
        }
        model.updated_at = Set(now_sec());

        Ok(model.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        filter: &MovieFilter,
        page: u64,
        per_page: u64,
    ) -> CatalogResult<Page<MovieWithCategory>> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let mut query = movie::Entity::find()
            .find_also_related(category::Entity)
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id);

        if let Some(term) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(movie::Column::Judul.like(contains_pattern(term)))
                    .add(movie::Column::Sinopsis.like(contains_pattern(term))),
            );
        }

        let paginator = query.paginate(&self.db, per_page);
        let ItemsAndPagesNumber { number_of_items, number_of_pages } =
            paginator.num_items_and_pages().await?;
        // Pages past the end are empty without a query.
        let items = if page > number_of_pages {
            Vec::new()
        } else {
            paginator
                .fetch_page(page - 1)
                .await?
                .into_iter()
                .map(|(movie, category)| MovieWithCategory { movie, category })
                .collect()
        };

        Ok(Page {
            items,
            page,
            per_page,
            total: number_of_items,
            last_page: number_of_pages.max(1),
        })
    }

    pub async fn categories(&self) -> CatalogResult<Vec<category::Model>> {
        Ok(category::Entity::find().order_by_asc(category::Column::Name).all(&self.db).await?)
    }

    pub async fn category_exists(&self, id: i32) -> CatalogResult<bool> {
        Ok(category::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }
}

/// `%term%` with LIKE wildcards in the term matched literally. SQLite's LIKE
/// ignores ASCII case.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

