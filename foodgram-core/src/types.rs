use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type RecipeId = Uuid;
pub type TagId = i32;
pub type IngredientId = i32;

/// Whoever is making the request. Anonymous callers have no id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Option<UserId>,
}

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self { id: None }
    }

    pub fn authenticated(id: UserId) -> Self {
        Self { id: Some(id) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// One `{id, amount}` entry as submitted by a client, before bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmountInput {
    pub id: IngredientId,
    pub amount: i64,
}

/// Write body for recipe create and update. Both replace the full state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub cooking_time: i64,
    #[serde(default)]
    pub tags: Option<Vec<TagId>>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: IngredientId,
    pub amount: i32,
}

/// A payload that passed every rule, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author_id: UserId,
    pub name: String,
    pub image: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub cooking_time: i32,
    pub short_link: Option<String>,
    pub tags: Vec<TagId>,
    pub ingredients: Vec<IngredientAmount>,
}

impl Recipe {
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Ingredient line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Read model of a recipe as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: RecipeId,
    pub author: User,
    pub name: String,
    pub image: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub cooking_time: i32,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    /// Whether the viewer follows the author. False for anonymous viewers.
    pub author_subscribed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Favorite,
    ShoppingCart,
}

impl MarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Favorite => "favorite",
            MarkKind::ShoppingCart => "shopping_cart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub kind: MarkKind,
    pub user_id: UserId,
    pub recipe_id: RecipeId,
}

/// One ingredient line of a recipe sitting in somebody's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub unit: String,
    pub amount: i32,
}

/// Consolidated shopping-list entry. `i64` holds any realistic
/// `MAX_AMOUNT * recipes` sum without overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub unit: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub subscriber_id: UserId,
    pub author_id: UserId,
}

/// An author as listed on the subscriptions page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    #[serde(flatten)]
    pub user: User,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}
