//! Site option entity - Stores the key-value pairs behind the maintenance settings.
//! Each row holds one raw option (e.g. `enable_maintenance_mode`) as a string.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site option database model - one row per option key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_options")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Option key (e.g., `"maintenance_start"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Option value stored as string
    pub value: String,
    /// When this option was last written
    pub updated_at: DateTime,
}

/// `SiteOption` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
