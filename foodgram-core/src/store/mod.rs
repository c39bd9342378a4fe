//! Storage seams for the recipe core.
//!
//! The services never talk to a database directly. They are handed something
//! implementing these traits: the Postgres store in the server crate, or
//! [`MemoryStore`] in tests. Uniqueness constraints live in the store; the
//! services only pre-check so they can report a clean error.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::types::{
    CartLine, CurrentUser, Ingredient, IngredientId, Mark, MarkKind, Recipe, RecipeFilter,
    RecipeId, RecipeSummary, RecipeView, Subscription, Tag, TagId, User, UserId,
    ValidatedRecipe,
};

pub type StoreResult<T> = Result<T, StoreError>;

/// Resolves who is calling. Authentication itself happens elsewhere.
pub trait IdentityStore: Send + Sync {
    /// Unknown or expired tokens resolve to an anonymous user.
    fn current_user(&self, token: Option<&str>) -> StoreResult<CurrentUser>;

    fn user(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// Read-only canonical ingredients and tags.
pub trait CatalogStore: Send + Sync {
    fn ingredient_exists(&self, id: IngredientId) -> StoreResult<bool>;

    fn tag_exists(&self, id: TagId) -> StoreResult<bool>;

    /// Ingredients whose name starts with `prefix`, ordered by name.
    fn ingredients_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Ingredient>>;

    fn ingredient(&self, id: IngredientId) -> StoreResult<Option<Ingredient>>;

    fn tags(&self) -> StoreResult<Vec<Tag>>;

    fn tag(&self, id: TagId) -> StoreResult<Option<Tag>>;
}

/// Durable storage for recipe aggregates and everything hanging off them.
pub trait RecipeRepository: Send + Sync {
    /// Writes the recipe row, its ingredient lines and its tags atomically.
    fn create(&self, author_id: UserId, recipe: &ValidatedRecipe) -> StoreResult<Recipe>;

    /// Replaces scalar fields and wholesale-replaces ingredient lines and tags
    /// atomically. `pub_date`, author and short link are left alone.
    fn update(&self, id: RecipeId, recipe: &ValidatedRecipe) -> StoreResult<Recipe>;

    /// Removes the recipe together with its lines, tags, marks and short link.
    fn delete(&self, id: RecipeId) -> StoreResult<()>;

    fn get(&self, id: RecipeId) -> StoreResult<Recipe>;

    /// Newest first. Flag filters only apply for an authenticated viewer.
    fn list(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<Vec<Recipe>>;

    /// Number of recipes matching `filter`, ignoring `limit` and `offset`.
    fn count(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<i64>;

    /// Resolves author, tags, ingredient names and the viewer's flags,
    /// including whether the viewer follows the author.
    fn view(&self, recipe: &Recipe, viewer: Option<UserId>) -> StoreResult<RecipeView>;

    fn recipes_by_author(
        &self,
        author_id: UserId,
        limit: Option<i64>,
    ) -> StoreResult<Vec<RecipeSummary>>;

    fn count_by_author(&self, author_id: UserId) -> StoreResult<i64>;

    fn has_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<bool>;

    /// Fails with [`StoreError::Conflict`] when the pair is already marked.
    fn add_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<Mark>;

    /// Returns whether a mark was actually removed.
    fn remove_mark(
        &self,
        kind: MarkKind,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> StoreResult<bool>;

    /// Every ingredient line of every recipe in the user's shopping cart.
    fn cart_lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>>;

    /// Stores `token` unless the recipe already has one; returns whatever
    /// token the recipe ends up with. A token held by another recipe is a
    /// [`StoreError::Conflict`].
    fn assign_short_link(&self, recipe_id: RecipeId, token: &str) -> StoreResult<String>;

    fn resolve_short_link(&self, token: &str) -> StoreResult<Option<RecipeId>>;
}

pub trait SubscriptionRepository: Send + Sync {
    fn is_subscribed(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool>;

    /// Fails with [`StoreError::Conflict`] on a duplicate pair.
    fn subscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<Subscription>;

    fn unsubscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool>;

    /// Followed authors ordered by username.
    fn subscribed_authors(
        &self,
        subscriber_id: UserId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StoreResult<Vec<User>>;
}

/// Everything the HTTP layer needs from one backend.
pub trait Store: IdentityStore + CatalogStore + RecipeRepository + SubscriptionRepository {}

impl<T> Store for T where
    T: IdentityStore + CatalogStore + RecipeRepository + SubscriptionRepository
{
}
