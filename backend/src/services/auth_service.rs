use std::sync::Arc;

use marketplace_shared::{
    AuthResponse, LoginRequest, RegisterRequest, UserResponse, UserRole, ERROR_INVALID_CREDENTIALS, SUCCESS_LOGIN,
    SUCCESS_USER_CREATED, TOKEN_TYPE_BEARER,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewShop, NewUser, User};
use crate::repositories::{finish, Repository, UnitOfWork};
use crate::utils::jwt::{Claims, JwtService};
use crate::utils::{hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn Repository>,
    jwt_service: JwtService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repo: Arc<dyn Repository>, jwt_service: JwtService, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            jwt_service,
            bcrypt_cost,
        }
    }

    /// Register a new account with the given role.
    ///
    /// Sellers get their shop in the same transaction, inactive and awaiting approval.
    pub async fn register(&self, role: UserRole, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;
        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        let new_user = NewUser {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash,
            role,
        };

        let mut uow = self.repo.begin().await?;
        let result = Self::register_in(uow.as_mut(), new_user).await;
        let user = finish(uow, result).await?;

        info!(user_id = %user.id, role = %role, "User registered");
        let message = format!("{} {}", capitalize(role.as_str()), SUCCESS_USER_CREATED);
        self.auth_response(message, &user)
    }

    async fn register_in(uow: &mut dyn UnitOfWork, new_user: NewUser) -> Result<User, AppError> {
        let user = uow.insert_user(new_user).await?;
        if user.role == UserRole::Seller {
            uow.insert_shop(NewShop::placeholder(user.id, &user.name, false)).await?;
        }
        Ok(user)
    }

    /// Login with email and password
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = uow.find_user_by_email(request.email.trim()).await;
        let user = finish(uow, result)
            .await?
            .ok_or_else(|| AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        self.auth_response(SUCCESS_LOGIN.to_string(), &user)
    }

    /// Revoke the token the caller authenticated with.
    pub fn logout(&self, claims: &Claims) -> Result<(), AppError> {
        self.jwt_service.revoke_token(&claims.jti, claims.exp)?;
        info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let mut uow = self.repo.begin().await?;
        let result = uow.find_user(user_id).await;
        let user = finish(uow, result)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.to_response())
    }

    fn auth_response(&self, message: String, user: &User) -> Result<AuthResponse, AppError> {
        let token = self
            .jwt_service
            .generate_access_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            message,
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.jwt_service.expires_in(),
            user: user.to_response(),
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestMarket;
    use marketplace_shared::ShopApproval;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn seller_registration_creates_pending_shop() {
        let market = TestMarket::new();
        let response = market
            .auth
            .register(UserRole::Seller, register_request("ada@example.com"))
            .await
            .unwrap();

        assert_eq!(response.message, "Seller registered successfully");
        assert_eq!(response.token_type, "Bearer");
        let state = market.repo.snapshot().await;
        assert_eq!(state.shops.len(), 1);
        assert_eq!(state.shops[0].name, "Ada's Shop");
        assert!(!state.shops[0].is_active);
        assert_eq!(state.shops[0].approval_status, ShopApproval::Pending);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let market = TestMarket::new();
        market
            .auth
            .register(UserRole::Customer, register_request("ada@example.com"))
            .await
            .unwrap();

        let err = market
            .auth
            .register(UserRole::Customer, register_request("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let market = TestMarket::new();
        market
            .auth
            .register(UserRole::Customer, register_request("ada@example.com"))
            .await
            .unwrap();

        let ok = market
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.role, UserRole::Customer);

        let err = market
            .auth
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let market = TestMarket::new();
        let response = market
            .auth
            .register(UserRole::Customer, register_request("ada@example.com"))
            .await
            .unwrap();

        let claims = market.jwt.validate_token(&response.token).unwrap();
        market.auth.logout(&claims).unwrap();
        assert!(market.jwt.validate_token(&response.token).is_err());
    }

    #[tokio::test]
    async fn short_password_fails_validation() {
        let market = TestMarket::new();
        let mut request = register_request("ada@example.com");
        request.password = "short".to_string();

        let err = market.auth.register(UserRole::Customer, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
