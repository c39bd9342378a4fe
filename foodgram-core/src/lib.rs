pub mod error;
pub mod membership;
pub mod recipes;
pub mod shopping_list;
pub mod short_link;
pub mod store;
pub mod subscriptions;
pub mod types;
pub mod validator;

pub use error::{CoreError, CoreResult, StoreError, ValidationError};
pub use membership::MembershipService;
pub use recipes::RecipeService;
pub use shopping_list::{render_shopping_list, ShoppingListAggregator, SHOPPING_LIST_HEADER};
pub use short_link::{RandomTokenGenerator, ShortLinkService, TokenGenerator};
pub use store::{
    CatalogStore, IdentityStore, MemoryStore, RecipeRepository, Store, StoreResult,
    SubscriptionRepository,
};
pub use subscriptions::SubscriptionService;
pub use types::{
    AuthorSummary, CartLine, CurrentUser, Ingredient, IngredientAmount, IngredientAmountInput,
    IngredientId, Mark, MarkKind, Recipe, RecipeFilter, RecipeId, RecipeIngredientView,
    RecipePayload, RecipeSummary, RecipeView, ShoppingListItem, Subscription, Tag, TagId, User,
    UserId, ValidatedRecipe,
};
pub use validator::RecipeValidator;

pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 32_000;
pub const MIN_AMOUNT: i64 = 1;
pub const MAX_AMOUNT: i64 = 32_000;
pub const NAME_MAX_LENGTH: usize = 256;

/// Length of a generated short-link token.
pub const SHORT_LINK_LENGTH: usize = 8;
/// How many fresh tokens are tried before giving up on a collision streak.
pub const SHORT_LINK_ATTEMPTS: usize = 5;
