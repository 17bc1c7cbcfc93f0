//! User service
//!
//! Handles registration and admin-side account management.

use blog_core::access::{check_user_change, check_user_deletion, Identity};
use blog_core::entities::{User, UserChanges};
use blog_core::{Permissions, Role};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    PageParams, PaginatedResponse, RegisterUserRequest, UpdateUserRequest, UserResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::AuthorizationGuard;
use super::pagination::Page;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn guard(&self) -> AuthorizationGuard<'a> {
        AuthorizationGuard::new(self.ctx)
    }

    /// Register a new account; every account starts as an active viewer
    #[instrument(skip(self, request))]
    pub async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> ServiceResult<UserResponse> {
        let request = RegisterUserRequest {
            email: request.email.trim().to_lowercase(),
            name: request.name.trim().to_string(),
        };
        request.validate()?;
        let RegisterUserRequest { email, name } = request;

        if self.ctx.user_repo().find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("Email already in use"));
        }

        let user = User::new(Uuid::new_v4(), email, name, self.ctx.now());
        self.ctx.user_repo().create(&user).await?;

        info!(user_id = %user.id, "User registered");

        Ok(UserResponse::from(&user))
    }

    /// Get one account
    #[instrument(skip(self))]
    pub async fn get_user(
        &self,
        identity: Option<Identity>,
        user_id: Uuid,
    ) -> ServiceResult<UserResponse> {
        self.guard()
            .require(identity, Permissions::MANAGE_USERS)
            .await?;

        let user = self.find_user(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// List accounts, oldest first
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        identity: Option<Identity>,
        params: PageParams,
    ) -> ServiceResult<PaginatedResponse<UserResponse>> {
        self.guard()
            .require(identity, Permissions::MANAGE_USERS)
            .await?;

        let page = Page::resolve(self.ctx.policy(), &params);
        let total = self.ctx.user_repo().count().await?;
        let users = self
            .ctx
            .user_repo()
            .list(page.limit(), page.offset())
            .await?;

        Ok(PaginatedResponse::new(users, page.page, page.per_page, total)
            .map(|user| UserResponse::from(&user)))
    }

    /// Change an account's role, active flag or name
    #[instrument(skip(self, request))]
    pub async fn update_user_role_or_status(
        &self,
        identity: Option<Identity>,
        target_id: Uuid,
        request: UpdateUserRequest,
    ) -> ServiceResult<UserResponse> {
        let guard = self.guard();
        let principal = guard.require(identity, Permissions::MANAGE_USERS).await?;
        request.validate()?;

        let role = request
            .role
            .as_deref()
            .map(|r| {
                r.parse::<Role>()
                    .map_err(|e| ServiceError::validation("role", e.to_string()))
            })
            .transpose()?;

        let changes = UserChanges {
            role,
            is_active: request.is_active,
            name: request.name.map(|n| n.trim().to_string()),
        };
        if changes.name.as_deref() == Some("") {
            return Err(ServiceError::validation("name", "must not be empty"));
        }

        guard.enforce(
            &principal,
            check_user_change(&principal, target_id, &changes),
            "update_user",
        )?;

        let target = self.find_user(target_id).await?;
        if changes.is_empty() {
            debug!(user_id = %target_id, "Nothing to update");
            return Ok(UserResponse::from(&target));
        }

        let updated = self
            .ctx
            .user_repo()
            .update(target_id, &changes, self.ctx.now())
            .await?;

        info!(
            user_id = %updated.id,
            admin_id = %principal.id,
            role = updated.role.as_str(),
            is_active = updated.is_active,
            "User updated"
        );

        Ok(UserResponse::from(&updated))
    }

    /// Hard-delete an account along with its content
    #[instrument(skip(self))]
    pub async fn delete_user(
        &self,
        identity: Option<Identity>,
        target_id: Uuid,
    ) -> ServiceResult<()> {
        let guard = self.guard();
        let principal = guard.require(identity, Permissions::MANAGE_USERS).await?;
        guard.enforce(
            &principal,
            check_user_deletion(&principal, target_id),
            "delete_user",
        )?;

        self.ctx.user_repo().delete(target_id).await?;

        info!(user_id = %target_id, admin_id = %principal.id, "User deleted");

        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }
}
