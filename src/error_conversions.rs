//! Error conversion glue between the domain and the shared error types.
//!
//! The domain layer does not depend on service or repository errors; the
//! conversions live here so `?` works across layer boundaries.

use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::services::errors::ServiceError;

use crate::domain::types::TypeConstraintError;
use crate::forms::listings::{AddListingFormError, UpdateListingFormError};

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<AddListingFormError> for ServiceError {
    fn from(val: AddListingFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<UpdateListingFormError> for ServiceError {
    fn from(val: UpdateListingFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
