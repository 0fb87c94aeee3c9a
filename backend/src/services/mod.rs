//! Business operations.
//!
//! Every public method runs inside exactly one unit of work and receives the
//! caller as an explicit [`Actor`]; nothing reads a global current user.

use marketplace_shared::UserRole;
use uuid::Uuid;

use crate::error::AppError;

pub mod account_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_service;
pub mod report_service;
pub mod review_service;
pub mod seller_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use account_service::AccountService;
pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use order_service::OrderService;
pub use report_service::ReportService;
pub use review_service::ReviewService;
pub use seller_service::{SellerProfile, SellerService};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Fail with `Authorization` unless the caller has `role` or is an admin.
    pub fn require(&self, role: UserRole) -> Result<(), AppError> {
        if UserRole::satisfies(role, self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("This action requires the {} role", role)))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_gate() {
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        assert!(admin.require(UserRole::Seller).is_ok());
        assert!(admin.require(UserRole::Customer).is_ok());

        let seller = Actor::new(Uuid::new_v4(), UserRole::Seller);
        assert!(seller.require(UserRole::Seller).is_ok());
        assert!(matches!(seller.require(UserRole::Admin), Err(AppError::Authorization(_))));
        assert!(matches!(seller.require(UserRole::Customer), Err(AppError::Authorization(_))));
    }
}
