//! Recipe write validation.
//!
//! Rules run as sequential guards and the first one that fails is the only
//! error reported. Clients key their messages off that first error, so the
//! order below is part of the contract:
//!
//! 1. image present (create) or kept/replaced (update)
//! 2. tag list non-empty
//! 3. ingredient list non-empty
//! 4. tags: no repeats, each known to the catalog
//! 5. ingredients: no repeats, each known to the catalog
//! 6. ingredient amounts in bounds
//! 7. cooking time in bounds
//! 8. name and text

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::store::CatalogStore;
use crate::types::{CurrentUser, IngredientAmount, Recipe, RecipePayload, ValidatedRecipe};
use crate::{MAX_AMOUNT, MAX_COOKING_TIME, MIN_AMOUNT, MIN_COOKING_TIME, NAME_MAX_LENGTH};
use std::collections::HashSet;

pub struct RecipeValidator<'a, C: CatalogStore + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: CatalogStore + ?Sized> RecipeValidator<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Checks `payload` against the catalog. `existing` is the recipe being
    /// updated, or `None` on create.
    pub fn validate(
        &self,
        payload: &RecipePayload,
        existing: Option<&Recipe>,
        current_user: &CurrentUser,
    ) -> CoreResult<ValidatedRecipe> {
        if !current_user.is_authenticated() {
            return Err(CoreError::Unauthorized);
        }

        let supplied_image = payload
            .image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty());
        let image = match (supplied_image, existing) {
            (Some(image), _) => image.to_string(),
            (None, Some(recipe)) => recipe.image.clone(),
            (None, None) => return Err(ValidationError::MissingImage.into()),
        };

        let tags = match payload.tags.as_deref() {
            Some(tags) if !tags.is_empty() => tags,
            _ => return Err(ValidationError::NoTags.into()),
        };
        let ingredients = match payload.ingredients.as_deref() {
            Some(ingredients) if !ingredients.is_empty() => ingredients,
            _ => return Err(ValidationError::NoIngredients.into()),
        };

        let mut checked_tags = HashSet::new();
        for tag in tags {
            if checked_tags.contains(tag) {
                return Err(ValidationError::DuplicateTag.into());
            }
            if !self.catalog.tag_exists(*tag)? {
                return Err(ValidationError::UnknownTag(*tag).into());
            }
            checked_tags.insert(*tag);
        }

        let mut checked_ingredients = HashSet::new();
        for ingredient in ingredients {
            if checked_ingredients.contains(&ingredient.id) {
                return Err(ValidationError::DuplicateIngredient.into());
            }
            if !self.catalog.ingredient_exists(ingredient.id)? {
                return Err(ValidationError::UnknownIngredient(ingredient.id).into());
            }
            checked_ingredients.insert(ingredient.id);
        }

        let mut lines = Vec::with_capacity(ingredients.len());
        for ingredient in ingredients {
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&ingredient.amount) {
                return Err(ValidationError::AmountOutOfRange(ingredient.amount).into());
            }
            lines.push(IngredientAmount {
                id: ingredient.id,
                amount: ingredient.amount as i32,
            });
        }

        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&payload.cooking_time) {
            return Err(ValidationError::CookingTimeOutOfRange(payload.cooking_time).into());
        }

        let name = payload.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(ValidationError::NameTooLong.into());
        }
        if payload.text.trim().is_empty() {
            return Err(ValidationError::EmptyText.into());
        }

        Ok(ValidatedRecipe {
            name: name.to_string(),
            text: payload.text.clone(),
            image,
            cooking_time: payload.cooking_time as i32,
            tags: tags.to_vec(),
            ingredients: lines,
        })
    }
}
