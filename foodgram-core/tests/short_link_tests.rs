mod common;

use common::Kitchen;
use foodgram_core::{
    CoreError, RecipeRepository, ShortLinkService, TokenGenerator, SHORT_LINK_ATTEMPTS,
    SHORT_LINK_LENGTH,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Hands out a fixed sequence of tokens and counts how many were asked for.
struct ScriptedTokens {
    tokens: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedTokens {
    fn new(tokens: &[&str], fallback: &str) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenGenerator for ScriptedTokens {
    fn generate(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[test]
fn test_get_or_create_is_stable() {
    let k = Kitchen::new();
    let soup = k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    let service = ShortLinkService::new(&k.store);

    let first = service.get_or_create(soup.id).unwrap();
    let second = service.get_or_create(soup.id).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), SHORT_LINK_LENGTH);
    assert_eq!(service.resolve(&first).unwrap(), soup.id);
    assert_eq!(k.store.get(soup.id).unwrap().short_link, Some(first));
}

#[test]
fn test_unknown_token_is_not_found() {
    let k = Kitchen::new();
    let result = ShortLinkService::new(&k.store).resolve("nope1234");
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[test]
fn test_unknown_recipe_is_not_found() {
    let k = Kitchen::new();
    let result = ShortLinkService::new(&k.store).get_or_create(uuid::Uuid::new_v4());
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[test]
fn test_collision_is_retried_with_fresh_token() {
    let k = Kitchen::new();
    let soup = k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    let eggs = k.publish(&k.as_alice(), "Eggs", &[k.breakfast], &[(k.egg, 2)]);

    let first = ScriptedTokens::new(&["AAAAAAAA"], "unused00");
    ShortLinkService::with_generator(&k.store, &first)
        .get_or_create(soup.id)
        .unwrap();

    let second = ScriptedTokens::new(&["AAAAAAAA", "AAAAAAAA", "BBBBBBBB"], "unused00");
    let token = ShortLinkService::with_generator(&k.store, &second)
        .get_or_create(eggs.id)
        .unwrap();

    assert_eq!(token, "BBBBBBBB");
    assert_eq!(second.calls(), 3);
    let service = ShortLinkService::new(&k.store);
    assert_eq!(service.resolve("AAAAAAAA").unwrap(), soup.id);
    assert_eq!(service.resolve("BBBBBBBB").unwrap(), eggs.id);
}

#[test]
fn test_collision_retries_are_bounded() {
    let k = Kitchen::new();
    let soup = k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    let eggs = k.publish(&k.as_alice(), "Eggs", &[k.breakfast], &[(k.egg, 2)]);
    let taken = ScriptedTokens::new(&[], "TAKEN000");
    ShortLinkService::with_generator(&k.store, &taken)
        .get_or_create(soup.id)
        .unwrap();

    let always_taken = ScriptedTokens::new(&[], "TAKEN000");
    let result = ShortLinkService::with_generator(&k.store, &always_taken).get_or_create(eggs.id);

    assert!(matches!(result, Err(CoreError::Unavailable(_))));
    assert_eq!(always_taken.calls(), SHORT_LINK_ATTEMPTS);
    assert_eq!(k.store.get(eggs.id).unwrap().short_link, None);
}

#[test]
fn test_existing_token_skips_generation() {
    let k = Kitchen::new();
    let soup = k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    let service = ShortLinkService::new(&k.store);
    let token = service.get_or_create(soup.id).unwrap();

    let generator = ScriptedTokens::new(&[], "OTHER000");
    let again = ShortLinkService::with_generator(&k.store, &generator)
        .get_or_create(soup.id)
        .unwrap();

    assert_eq!(again, token);
    assert_eq!(generator.calls(), 0);
}

#[test]
fn test_custom_attempt_budget() {
    let k = Kitchen::new();
    let soup = k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    let eggs = k.publish(&k.as_alice(), "Eggs", &[k.breakfast], &[(k.egg, 2)]);
    k.store.assign_short_link(soup.id, "TAKEN000").unwrap();

    let generator = ScriptedTokens::new(&[], "TAKEN000");
    let result = ShortLinkService::with_generator(&k.store, &generator)
        .max_attempts(2)
        .get_or_create(eggs.id);

    assert!(matches!(result, Err(CoreError::Unavailable(_))));
    assert_eq!(generator.calls(), 2);
}
