//! User model -> entity mapper

use blog_core::entities::User;
use blog_core::value_objects::Role;

use crate::models::UserModel;

use super::parse_column;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: model.id,
            email: model.email,
            name: model.name,
            role: parse_column::<Role>("users", "role", &model.role),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
