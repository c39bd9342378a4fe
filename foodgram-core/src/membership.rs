//! Favorites and shopping cart.
//!
//! Adding twice and removing something that is not there are both reported
//! to the caller. The (user, recipe) unique constraint in the store is what
//! actually guarantees a single row; the pre-check here only turns the common
//! case into a readable message.

use crate::error::{CoreError, CoreResult, StoreError};
use crate::store::RecipeRepository;
use crate::types::{CurrentUser, MarkKind, RecipeId, RecipeSummary};

pub const ALREADY_ADDED: &str = "Recipe already added";
pub const NOT_IN_LIST: &str = "Recipe is not in the list or was already removed";
const RECIPE_NOT_FOUND: &str = "Recipe not found";

pub struct MembershipService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> MembershipService<'a, S>
where
    S: RecipeRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn add(
        &self,
        kind: MarkKind,
        user: &CurrentUser,
        recipe_id: RecipeId,
    ) -> CoreResult<RecipeSummary> {
        let user_id = user.id.ok_or(CoreError::Unauthorized)?;

        if self.store.has_mark(kind, user_id, recipe_id)? {
            return Err(CoreError::AlreadyExists(ALREADY_ADDED));
        }

        let recipe = self.store.get(recipe_id).map_err(|err| match err {
            StoreError::NotFound => CoreError::NotFound(RECIPE_NOT_FOUND),
            other => other.into(),
        })?;

        match self.store.add_mark(kind, user_id, recipe_id) {
            Ok(_) => {}
            // Lost a race with a concurrent add of the same pair.
            Err(StoreError::Conflict(_)) => return Err(CoreError::AlreadyExists(ALREADY_ADDED)),
            // Recipe deleted between the lookup and the insert.
            Err(StoreError::NotFound) => return Err(CoreError::NotFound(RECIPE_NOT_FOUND)),
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            kind = kind.as_str(),
            user_id = %user_id,
            recipe_id = %recipe_id,
            "mark added"
        );
        Ok(recipe.summary())
    }

    pub fn remove(&self, kind: MarkKind, user: &CurrentUser, recipe_id: RecipeId) -> CoreResult<()> {
        let user_id = user.id.ok_or(CoreError::Unauthorized)?;

        if !self.store.remove_mark(kind, user_id, recipe_id)? {
            return Err(CoreError::MarkMissing(NOT_IN_LIST));
        }

        tracing::info!(
            kind = kind.as_str(),
            user_id = %user_id,
            recipe_id = %recipe_id,
            "mark removed"
        );
        Ok(())
    }
}
