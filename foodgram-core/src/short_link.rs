//! Short shareable links for recipes.

use crate::error::{CoreError, CoreResult, StoreError};
use crate::store::RecipeRepository;
use crate::types::RecipeId;
use crate::{SHORT_LINK_ATTEMPTS, SHORT_LINK_LENGTH};
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const RECIPE_NOT_FOUND: &str = "Recipe not found";
const LINK_NOT_FOUND: &str = "Short link not found";

/// Source of candidate tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// URL-safe random tokens of [`SHORT_LINK_LENGTH`] characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..SHORT_LINK_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

pub struct ShortLinkService<'a, S: ?Sized, G: ?Sized = RandomTokenGenerator> {
    store: &'a S,
    generator: &'a G,
    max_attempts: usize,
}

impl<'a, S> ShortLinkService<'a, S>
where
    S: RecipeRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self::with_generator(store, &RandomTokenGenerator)
    }
}

impl<'a, S, G> ShortLinkService<'a, S, G>
where
    S: RecipeRepository + ?Sized,
    G: TokenGenerator + ?Sized,
{
    pub fn with_generator(store: &'a S, generator: &'a G) -> Self {
        Self {
            store,
            generator,
            max_attempts: SHORT_LINK_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns the recipe's token, issuing one on first request. Collisions
    /// with another recipe's token are retried with a fresh token.
    pub fn get_or_create(&self, recipe_id: RecipeId) -> CoreResult<String> {
        let recipe = self.store.get(recipe_id).map_err(|err| match err {
            StoreError::NotFound => CoreError::NotFound(RECIPE_NOT_FOUND),
            other => other.into(),
        })?;
        if let Some(token) = recipe.short_link {
            return Ok(token);
        }

        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();
            match self.store.assign_short_link(recipe_id, &candidate) {
                Ok(token) => {
                    tracing::info!(recipe_id = %recipe_id, attempt, "short link issued");
                    return Ok(token);
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::warn!(recipe_id = %recipe_id, attempt, "short link collision");
                }
                Err(StoreError::NotFound) => return Err(CoreError::NotFound(RECIPE_NOT_FOUND)),
                Err(err) => return Err(err.into()),
            }
        }

        Err(CoreError::Unavailable(format!(
            "could not issue a unique short link after {} attempts",
            self.max_attempts
        )))
    }

    pub fn resolve(&self, token: &str) -> CoreResult<RecipeId> {
        self.store
            .resolve_short_link(token)?
            .ok_or(CoreError::NotFound(LINK_NOT_FOUND))
    }
}
