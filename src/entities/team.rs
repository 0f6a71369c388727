// SPDX-License-Identifier: MIT

//! Team entity.
//!
//! Rows are created and updated only by the reference-data sync, keyed by
//! the upper-cased abbreviation (the stable external key).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Upper-cased, at most 3 characters.
    #[sea_orm(unique, indexed)]
    pub abbreviation: String,
    pub city: Option<String>,
    /// Home arena, when the arena dataset has an entry for this team.
    pub arena_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::arena::Entity",
        from = "Column::ArenaId",
        to = "super::arena::Column::Id"
    )]
    Arena,
}

impl Related<super::arena::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Arena.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
