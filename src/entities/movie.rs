use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub judul: String,
    pub category_id: i32,
    #[sea_orm(column_type = "Text")]
    pub sinopsis: String,
    pub tahun: i32,
    pub pemain: String,
    /// File name inside the images directory, empty when the movie has no cover.
    pub foto_sampul: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn has_cover(&self) -> bool {
        !self.foto_sampul.is_empty()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
