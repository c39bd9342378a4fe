//! In-memory store.
//!
//! Enforces the same uniqueness and referential rules the Postgres schema
//! does, so services behave identically on top of it. A single mutex guards
//! all state, which makes every operation atomic.

use super::{CatalogStore, IdentityStore, RecipeRepository, StoreResult, SubscriptionRepository};
use crate::error::StoreError;
use crate::types::{
    CartLine, CurrentUser, Ingredient, IngredientId, Mark, MarkKind, Recipe, RecipeFilter,
    RecipeId, RecipeIngredientView, RecipeSummary, RecipeView, Subscription, Tag, TagId, User,
    UserId, ValidatedRecipe,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    sessions: HashMap<String, UserId>,
    tags: BTreeMap<TagId, Tag>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    last_catalog_id: i32,
    /// Insertion order; listings walk it backwards to get newest first.
    recipes: Vec<Recipe>,
    marks: HashSet<(MarkKind, UserId, RecipeId)>,
    subscriptions: Vec<Subscription>,
}

impl State {
    fn recipe(&self, id: RecipeId) -> StoreResult<&Recipe> {
        self.recipes
            .iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)
    }

    fn recipe_mut(&mut self, id: RecipeId) -> StoreResult<&mut Recipe> {
        self.recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)
    }

    /// Mirrors the primary keys and foreign keys of the child tables.
    fn check_children(&self, recipe: &ValidatedRecipe) -> StoreResult<()> {
        let mut seen_tags = HashSet::new();
        for tag_id in &recipe.tags {
            if !seen_tags.insert(*tag_id) {
                return Err(StoreError::Conflict(format!(
                    "duplicate tag {} on recipe",
                    tag_id
                )));
            }
            if !self.tags.contains_key(tag_id) {
                return Err(StoreError::Backend(format!("tag {} does not exist", tag_id)));
            }
        }

        let mut seen_ingredients = HashSet::new();
        for line in &recipe.ingredients {
            if !seen_ingredients.insert(line.id) {
                return Err(StoreError::Conflict(format!(
                    "duplicate ingredient {} on recipe",
                    line.id
                )));
            }
            if !self.ingredients.contains_key(&line.id) {
                return Err(StoreError::Backend(format!(
                    "ingredient {} does not exist",
                    line.id
                )));
            }
        }

        Ok(())
    }

    fn has_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> bool {
        self.marks.contains(&(kind, user_id, recipe_id))
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter, viewer: Option<UserId>) -> bool {
        if let Some(author) = filter.author {
            if recipe.author_id != author {
                return false;
            }
        }

        if !filter.tags.is_empty() {
            let tagged = recipe.tags.iter().any(|id| {
                self.tags
                    .get(id)
                    .is_some_and(|tag| filter.tags.contains(&tag.slug))
            });
            if !tagged {
                return false;
            }
        }

        if let Some(viewer) = viewer {
            let flags = [
                (MarkKind::Favorite, filter.is_favorited),
                (MarkKind::ShoppingCart, filter.is_in_shopping_cart),
            ];
            for (kind, wanted) in flags {
                if let Some(wanted) = wanted {
                    if self.has_mark(kind, viewer, recipe.id) != wanted {
                        return false;
                    }
                }
            }
        }

        true
    }
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: username.to_string(),
            last_name: String::new(),
        };
        self.lock().users.insert(user.id, user.clone());
        user
    }

    /// Registers a bearer token for `user_id`.
    pub fn add_session(&self, token: &str, user_id: UserId) {
        self.lock().sessions.insert(token.to_string(), user_id);
    }

    pub fn add_tag(&self, name: &str, slug: &str) -> TagId {
        let mut state = self.lock();
        state.last_catalog_id += 1;
        let id = state.last_catalog_id;
        state.tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
                slug: slug.to_string(),
            },
        );
        id
    }

    pub fn add_ingredient(&self, name: &str, measurement_unit: &str) -> IngredientId {
        let mut state = self.lock();
        state.last_catalog_id += 1;
        let id = state.last_catalog_id;
        state.ingredients.insert(
            id,
            Ingredient {
                id,
                name: name.to_string(),
                measurement_unit: measurement_unit.to_string(),
            },
        );
        id
    }
}

impl IdentityStore for MemoryStore {
    fn current_user(&self, token: Option<&str>) -> StoreResult<CurrentUser> {
        let state = self.lock();
        Ok(token
            .and_then(|t| state.sessions.get(t))
            .map(|id| CurrentUser::authenticated(*id))
            .unwrap_or_default())
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }
}

impl CatalogStore for MemoryStore {
    fn ingredient_exists(&self, id: IngredientId) -> StoreResult<bool> {
        Ok(self.lock().ingredients.contains_key(&id))
    }

    fn tag_exists(&self, id: TagId) -> StoreResult<bool> {
        Ok(self.lock().tags.contains_key(&id))
    }

    fn ingredients_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Ingredient>> {
        let mut found: Vec<Ingredient> = self
            .lock()
            .ingredients
            .values()
            .filter(|i| i.name.starts_with(prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn ingredient(&self, id: IngredientId) -> StoreResult<Option<Ingredient>> {
        Ok(self.lock().ingredients.get(&id).cloned())
    }

    fn tags(&self) -> StoreResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.lock().tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn tag(&self, id: TagId) -> StoreResult<Option<Tag>> {
        Ok(self.lock().tags.get(&id).cloned())
    }
}

impl RecipeRepository for MemoryStore {
    fn create(&self, author_id: UserId, recipe: &ValidatedRecipe) -> StoreResult<Recipe> {
        let mut state = self.lock();
        if !state.users.contains_key(&author_id) {
            return Err(StoreError::Backend(format!(
                "author {} does not exist",
                author_id
            )));
        }
        state.check_children(recipe)?;

        let created = Recipe {
            id: Uuid::new_v4(),
            author_id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            text: recipe.text.clone(),
            pub_date: Utc::now(),
            cooking_time: recipe.cooking_time,
            short_link: None,
            tags: recipe.tags.clone(),
            ingredients: recipe.ingredients.clone(),
        };
        state.recipes.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: RecipeId, recipe: &ValidatedRecipe) -> StoreResult<Recipe> {
        let mut state = self.lock();
        state.recipe(id)?;
        state.check_children(recipe)?;

        let existing = state.recipe_mut(id)?;
        existing.name = recipe.name.clone();
        existing.image = recipe.image.clone();
        existing.text = recipe.text.clone();
        existing.cooking_time = recipe.cooking_time;
        existing.tags = recipe.tags.clone();
        existing.ingredients = recipe.ingredients.clone();
        Ok(existing.clone())
    }

    fn delete(&self, id: RecipeId) -> StoreResult<()> {
        let mut state = self.lock();
        let index = state
            .recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        state.recipes.remove(index);
        state.marks.retain(|(_, _, recipe_id)| *recipe_id != id);
        Ok(())
    }

    fn get(&self, id: RecipeId) -> StoreResult<Recipe> {
        self.lock().recipe(id).cloned()
    }

    fn list(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<Vec<Recipe>> {
        let state = self.lock();
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter
            .limit
            .map(|l| l.max(0) as usize)
            .unwrap_or(usize::MAX);

        Ok(state
            .recipes
            .iter()
            .rev()
            .filter(|r| state.matches(r, filter, viewer))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<i64> {
        let state = self.lock();
        let count = state
            .recipes
            .iter()
            .filter(|r| state.matches(r, filter, viewer))
            .count();
        Ok(count as i64)
    }

    fn view(&self, recipe: &Recipe, viewer: Option<UserId>) -> StoreResult<RecipeView> {
        let state = self.lock();
        let author = state
            .users
            .get(&recipe.author_id)
            .cloned()
            .ok_or_else(|| StoreError::Backend(format!("author {} missing", recipe.author_id)))?;

        let mut tags: Vec<Tag> = recipe
            .tags
            .iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let mut ingredients: Vec<RecipeIngredientView> = recipe
            .ingredients
            .iter()
            .filter_map(|line| {
                state.ingredients.get(&line.id).map(|i| RecipeIngredientView {
                    id: i.id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: line.amount,
                })
            })
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));

        let flag = |kind| viewer.is_some_and(|user| state.has_mark(kind, user, recipe.id));
        let author_subscribed = viewer.is_some_and(|user| {
            state
                .subscriptions
                .iter()
                .any(|s| s.subscriber_id == user && s.author_id == recipe.author_id)
        });

        Ok(RecipeView {
            id: recipe.id,
            author,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            text: recipe.text.clone(),
            pub_date: recipe.pub_date,
            cooking_time: recipe.cooking_time,
            tags,
            ingredients,
            is_favorited: flag(MarkKind::Favorite),
            is_in_shopping_cart: flag(MarkKind::ShoppingCart),
            author_subscribed,
        })
    }

    fn recipes_by_author(
        &self,
        author_id: UserId,
        limit: Option<i64>,
    ) -> StoreResult<Vec<RecipeSummary>> {
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(self
            .lock()
            .recipes
            .iter()
            .rev()
            .filter(|r| r.author_id == author_id)
            .take(limit)
            .map(Recipe::summary)
            .collect())
    }

    fn count_by_author(&self, author_id: UserId) -> StoreResult<i64> {
        let count = self
            .lock()
            .recipes
            .iter()
            .filter(|r| r.author_id == author_id)
            .count();
        Ok(count as i64)
    }

    fn has_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<bool> {
        Ok(self.lock().has_mark(kind, user_id, recipe_id))
    }

    fn add_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<Mark> {
        let mut state = self.lock();
        state.recipe(recipe_id)?;
        if !state.marks.insert((kind, user_id, recipe_id)) {
            return Err(StoreError::Conflict(format!(
                "{} mark already exists",
                kind.as_str()
            )));
        }
        Ok(Mark {
            kind,
            user_id,
            recipe_id,
        })
    }

    fn remove_mark(
        &self,
        kind: MarkKind,
        user_id: UserId,
        recipe_id: RecipeId,
    ) -> StoreResult<bool> {
        Ok(self.lock().marks.remove(&(kind, user_id, recipe_id)))
    }

    fn cart_lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        let state = self.lock();
        let mut lines = Vec::new();
        for recipe in &state.recipes {
            if !state.has_mark(MarkKind::ShoppingCart, user_id, recipe.id) {
                continue;
            }
            for line in &recipe.ingredients {
                let ingredient = state.ingredients.get(&line.id).ok_or_else(|| {
                    StoreError::Backend(format!("ingredient {} missing", line.id))
                })?;
                lines.push(CartLine {
                    name: ingredient.name.clone(),
                    unit: ingredient.measurement_unit.clone(),
                    amount: line.amount,
                });
            }
        }
        Ok(lines)
    }

    fn assign_short_link(&self, recipe_id: RecipeId, token: &str) -> StoreResult<String> {
        let mut state = self.lock();
        if let Some(existing) = &state.recipe(recipe_id)?.short_link {
            return Ok(existing.clone());
        }

        let taken = state
            .recipes
            .iter()
            .any(|r| r.short_link.as_deref() == Some(token));
        if taken {
            return Err(StoreError::Conflict(format!(
                "short link {} already in use",
                token
            )));
        }

        state.recipe_mut(recipe_id)?.short_link = Some(token.to_string());
        Ok(token.to_string())
    }

    fn resolve_short_link(&self, token: &str) -> StoreResult<Option<RecipeId>> {
        Ok(self
            .lock()
            .recipes
            .iter()
            .find(|r| r.short_link.as_deref() == Some(token))
            .map(|r| r.id))
    }
}

impl SubscriptionRepository for MemoryStore {
    fn is_subscribed(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool> {
        Ok(self
            .lock()
            .subscriptions
            .iter()
            .any(|s| s.subscriber_id == subscriber_id && s.author_id == author_id))
    }

    fn subscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<Subscription> {
        let mut state = self.lock();
        if subscriber_id == author_id {
            return Err(StoreError::Backend(
                "subscriptions_prevent_self_follow violated".to_string(),
            ));
        }
        if !state.users.contains_key(&subscriber_id) || !state.users.contains_key(&author_id) {
            return Err(StoreError::NotFound);
        }

        let subscription = Subscription {
            subscriber_id,
            author_id,
        };
        if state.subscriptions.contains(&subscription) {
            return Err(StoreError::Conflict("subscription already exists".to_string()));
        }
        state.subscriptions.push(subscription);
        Ok(subscription)
    }

    fn unsubscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool> {
        let mut state = self.lock();
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|s| !(s.subscriber_id == subscriber_id && s.author_id == author_id));
        Ok(state.subscriptions.len() != before)
    }

    fn subscribed_authors(
        &self,
        subscriber_id: UserId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StoreResult<Vec<User>> {
        let state = self.lock();
        let mut authors: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .filter_map(|s| state.users.get(&s.author_id).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));

        let offset = offset.unwrap_or(0).max(0) as usize;
        let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(authors.into_iter().skip(offset).take(limit).collect())
    }
}
