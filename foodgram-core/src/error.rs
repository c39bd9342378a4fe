use crate::types::{IngredientId, TagId};
use crate::{MAX_AMOUNT, MAX_COOKING_TIME, MIN_AMOUNT, MIN_COOKING_TIME, NAME_MAX_LENGTH};
use thiserror::Error;

/// First rule a recipe payload broke. Validation stops at the first failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A recipe image is required")]
    MissingImage,

    #[error("At least one tag must be selected")]
    NoTags,

    #[error("At least one ingredient must be added")]
    NoIngredients,

    #[error("Tags must not repeat")]
    DuplicateTag,

    #[error("Unknown tag: {0}")]
    UnknownTag(TagId),

    #[error("The same ingredient cannot be added twice")]
    DuplicateIngredient,

    #[error("Unknown ingredient: {0}")]
    UnknownIngredient(IngredientId),

    #[error(
        "Ingredient amount must be between {min} and {max}, got {0}",
        min = MIN_AMOUNT,
        max = MAX_AMOUNT
    )]
    AmountOutOfRange(i64),

    #[error(
        "Cooking time must be between {min} and {max} minutes, got {0}",
        min = MIN_COOKING_TIME,
        max = MAX_COOKING_TIME
    )]
    CookingTimeOutOfRange(i64),

    #[error("Recipe name cannot be empty")]
    EmptyName,

    #[error("Recipe name must be at most {max} characters", max = NAME_MAX_LENGTH)]
    NameTooLong,

    #[error("Recipe description cannot be empty")]
    EmptyText,

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,
}

/// Failures a storage backend reports back to the services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

/// Errors surfaced by the services to their callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Only the author can change this recipe")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    AlreadyExists(&'static str),

    #[error("{0}")]
    MarkMissing(&'static str),

    /// A uniqueness constraint rejected a write the service did not expect
    /// to collide.
    #[error("Conflicting write: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CoreError::NotFound("Not found"),
            StoreError::Conflict(message) => CoreError::Conflict(message),
            StoreError::Backend(message) => CoreError::Storage(message),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_names_bounds() {
        let message = ValidationError::CookingTimeOutOfRange(0).to_string();
        assert_eq!(
            message,
            "Cooking time must be between 1 and 32000 minutes, got 0"
        );
    }

    #[test]
    fn test_store_conflict_stays_a_conflict() {
        let err: CoreError = StoreError::Conflict("recipe_ingredients_pkey".to_string()).into();
        assert_eq!(err, CoreError::Conflict("recipe_ingredients_pkey".to_string()));
        assert_eq!(err.to_string(), "Conflicting write: recipe_ingredients_pkey");
    }

    #[test]
    fn test_backend_failure_is_a_storage_error() {
        let err: CoreError = StoreError::Backend("connection reset".to_string()).into();
        assert_eq!(err, CoreError::Storage("connection reset".to_string()));
    }
}
