//! Users table (minimal entity).
//!
//! The engine stores trip ownership and collaborations by `user_id`, which is
//! the username. The email column is what invitations resolve against.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public identity of a user, safe to show to other members of a trip.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserRef {
    pub username: String,
    pub email: String,
}

impl From<Model> for UserRef {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            email: model.email,
        }
    }
}
