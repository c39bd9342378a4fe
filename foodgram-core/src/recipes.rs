use crate::error::{CoreError, CoreResult, StoreError};
use crate::store::{CatalogStore, RecipeRepository};
use crate::types::{CurrentUser, Recipe, RecipeFilter, RecipeId, RecipePayload, RecipeView};
use crate::validator::RecipeValidator;

/// Default page size for recipe listings.
pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

const RECIPE_NOT_FOUND: &str = "Recipe not found";

/// Create, update, delete and read recipe aggregates.
pub struct RecipeService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> RecipeService<'a, S>
where
    S: RecipeRepository + CatalogStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn create(&self, user: &CurrentUser, payload: &RecipePayload) -> CoreResult<RecipeView> {
        let validated = RecipeValidator::new(self.store).validate(payload, None, user)?;
        let author_id = user.id.ok_or(CoreError::Unauthorized)?;

        let recipe = self.store.create(author_id, &validated)?;
        tracing::info!(recipe_id = %recipe.id, author_id = %author_id, "recipe created");

        Ok(self.store.view(&recipe, user.id)?)
    }

    /// Full replace: tags and ingredient lines are rewritten from `payload`.
    pub fn update(
        &self,
        user: &CurrentUser,
        id: RecipeId,
        payload: &RecipePayload,
    ) -> CoreResult<RecipeView> {
        let existing = self.owned_recipe(user, id)?;
        let validated = RecipeValidator::new(self.store).validate(payload, Some(&existing), user)?;

        let recipe = self.store.update(id, &validated).map_err(not_found)?;
        tracing::info!(recipe_id = %recipe.id, "recipe updated");

        Ok(self.store.view(&recipe, user.id)?)
    }

    pub fn delete(&self, user: &CurrentUser, id: RecipeId) -> CoreResult<()> {
        self.owned_recipe(user, id)?;
        self.store.delete(id).map_err(not_found)?;
        tracing::info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }

    pub fn get(&self, viewer: &CurrentUser, id: RecipeId) -> CoreResult<RecipeView> {
        let recipe = self.store.get(id).map_err(not_found)?;
        Ok(self.store.view(&recipe, viewer.id)?)
    }

    pub fn list(&self, viewer: &CurrentUser, filter: &RecipeFilter) -> CoreResult<Vec<RecipeView>> {
        let mut filter = filter.clone();
        filter.limit = Some(
            filter
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        );
        filter.offset = Some(filter.offset.unwrap_or(0).max(0));

        self.store
            .list(&filter, viewer.id)?
            .iter()
            .map(|recipe| self.store.view(recipe, viewer.id).map_err(CoreError::from))
            .collect()
    }

    /// Total number of recipes `filter` matches, before pagination.
    pub fn count(&self, viewer: &CurrentUser, filter: &RecipeFilter) -> CoreResult<i64> {
        Ok(self.store.count(filter, viewer.id)?)
    }

    fn owned_recipe(&self, user: &CurrentUser, id: RecipeId) -> CoreResult<Recipe> {
        let user_id = user.id.ok_or(CoreError::Unauthorized)?;
        let recipe = self.store.get(id).map_err(not_found)?;
        if recipe.author_id != user_id {
            return Err(CoreError::Forbidden);
        }
        Ok(recipe)
    }
}

fn not_found(err: StoreError) -> CoreError {
    match err {
        StoreError::NotFound => CoreError::NotFound(RECIPE_NOT_FOUND),
        other => other.into(),
    }
}
