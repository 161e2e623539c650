use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

pub use pushkind_common::services::errors::{ServiceError, ServiceResult};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::types::UserId;

pub mod listings;
pub mod matches;

/// Checks the access role and resolves the caller's user id from the token
/// subject.
fn authorize(user: &AuthenticatedUser) -> ServiceResult<UserId> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    user.sub
        .parse::<i32>()
        .ok()
        .and_then(|id| UserId::new(id).ok())
        .ok_or_else(|| {
            log::error!("Invalid user id in user context: {}", user.sub);
            ServiceError::Internal
        })
}
