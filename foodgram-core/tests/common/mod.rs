//! Shared fixtures for the integration tests: a seeded in-memory store with a
//! small catalog and two users.

#![allow(dead_code)]

use foodgram_core::{
    CurrentUser, IngredientAmountInput, IngredientId, MemoryStore, RecipePayload, RecipeService,
    RecipeView, TagId, User,
};

pub struct Kitchen {
    pub store: MemoryStore,
    pub alice: User,
    pub bob: User,
    pub breakfast: TagId,
    pub dinner: TagId,
    pub lunch: TagId,
    pub flour: IngredientId,
    pub egg: IngredientId,
    pub sugar: IngredientId,
    pub milk: IngredientId,
}

impl Kitchen {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let alice = store.add_user("alice");
        let bob = store.add_user("bob");
        let breakfast = store.add_tag("Breakfast", "breakfast");
        let dinner = store.add_tag("Dinner", "dinner");
        let lunch = store.add_tag("Lunch", "lunch");
        let flour = store.add_ingredient("flour", "г");
        let egg = store.add_ingredient("egg", "шт");
        let sugar = store.add_ingredient("sugar", "г");
        let milk = store.add_ingredient("milk", "мл");
        Self {
            store,
            alice,
            bob,
            breakfast,
            dinner,
            lunch,
            flour,
            egg,
            sugar,
            milk,
        }
    }

    pub fn as_alice(&self) -> CurrentUser {
        CurrentUser::authenticated(self.alice.id)
    }

    pub fn as_bob(&self) -> CurrentUser {
        CurrentUser::authenticated(self.bob.id)
    }

    /// Creates a recipe owned by `user` with the given tags and lines.
    pub fn publish(
        &self,
        user: &CurrentUser,
        name: &str,
        tags: &[TagId],
        ingredients: &[(IngredientId, i64)],
    ) -> RecipeView {
        RecipeService::new(&self.store)
            .create(user, &payload(name, tags, ingredients))
            .expect("recipe should be created")
    }
}

pub fn payload(name: &str, tags: &[TagId], ingredients: &[(IngredientId, i64)]) -> RecipePayload {
    RecipePayload {
        name: name.to_string(),
        text: format!("How to make {}", name),
        image: Some(format!("recipes/images/{}.png", name)),
        cooking_time: 30,
        tags: Some(tags.to_vec()),
        ingredients: Some(
            ingredients
                .iter()
                .map(|(id, amount)| IngredientAmountInput {
                    id: *id,
                    amount: *amount,
                })
                .collect(),
        ),
    }
}
