// SPDX-License-Identifier: MIT

//! User entity.
//!
//! Firebase handles authentication; this row anchors everything relational
//! (visits, images) to a stable internal id. A user is created on first
//! successful authentication and never deleted by this subsystem.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// External identity id issued by Firebase; immutable after creation.
    #[sea_orm(unique, indexed)]
    pub firebase_uid: String,
    /// Empty string when Firebase released no email claim.
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visit::Entity")]
    Visit,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
