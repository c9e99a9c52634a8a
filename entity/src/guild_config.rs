//! Per-guild configuration document.
//!
//! One row per Discord guild. The `autoresponder` column holds the whole autoresponder
//! document for the guild as JSON (`{name: {enabled, response, ignore_role,
//! ignore_channel}}`) and is `NULL` until the guild has saved autoresponders at least once.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: String,
    pub prefix: String,
    #[sea_orm(nullable)]
    pub autoresponder: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
