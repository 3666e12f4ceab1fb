//! Entity module - Contains the SeaORM entity definitions for the database.
//! The maintenance gate only needs a single key-value table.

pub mod site_option;

pub use site_option::{Column as SiteOptionColumn, Entity as SiteOption, Model as SiteOptionModel};
