use crate::error::{CoreError, CoreResult, StoreError, ValidationError};
use crate::store::{IdentityStore, RecipeRepository, SubscriptionRepository};
use crate::types::{AuthorSummary, CurrentUser, User, UserId};

pub const ALREADY_SUBSCRIBED: &str = "Already subscribed to this author";
const USER_NOT_FOUND: &str = "User not found";
const SUBSCRIPTION_NOT_FOUND: &str = "Subscription not found";

/// Follow and unfollow recipe authors.
pub struct SubscriptionService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> SubscriptionService<'a, S>
where
    S: IdentityStore + RecipeRepository + SubscriptionRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn subscribe(
        &self,
        user: &CurrentUser,
        author_id: UserId,
        recipes_limit: Option<i64>,
    ) -> CoreResult<AuthorSummary> {
        let subscriber_id = user.id.ok_or(CoreError::Unauthorized)?;
        let author = self.author(author_id)?;

        if self.store.is_subscribed(subscriber_id, author_id)? {
            return Err(CoreError::AlreadyExists(ALREADY_SUBSCRIBED));
        }
        if subscriber_id == author_id {
            return Err(ValidationError::SelfSubscription.into());
        }

        match self.store.subscribe(subscriber_id, author_id) {
            Ok(_) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(CoreError::AlreadyExists(ALREADY_SUBSCRIBED))
            }
            Err(StoreError::NotFound) => return Err(CoreError::NotFound(USER_NOT_FOUND)),
            Err(err) => return Err(err.into()),
        }

        tracing::info!(subscriber_id = %subscriber_id, author_id = %author_id, "subscribed");
        self.summarize(author, true, recipes_limit)
    }

    pub fn unsubscribe(&self, user: &CurrentUser, author_id: UserId) -> CoreResult<()> {
        let subscriber_id = user.id.ok_or(CoreError::Unauthorized)?;
        self.author(author_id)?;

        if !self.store.unsubscribe(subscriber_id, author_id)? {
            return Err(CoreError::NotFound(SUBSCRIPTION_NOT_FOUND));
        }

        tracing::info!(subscriber_id = %subscriber_id, author_id = %author_id, "unsubscribed");
        Ok(())
    }

    /// Authors the user follows, each with their recipe count and newest
    /// recipes (capped by `recipes_limit`).
    pub fn subscriptions(
        &self,
        user: &CurrentUser,
        limit: Option<i64>,
        offset: Option<i64>,
        recipes_limit: Option<i64>,
    ) -> CoreResult<Vec<AuthorSummary>> {
        let subscriber_id = user.id.ok_or(CoreError::Unauthorized)?;

        self.store
            .subscribed_authors(subscriber_id, limit, offset)?
            .into_iter()
            .map(|author| self.summarize(author, true, recipes_limit))
            .collect()
    }

    fn author(&self, author_id: UserId) -> CoreResult<User> {
        self.store
            .user(author_id)?
            .ok_or(CoreError::NotFound(USER_NOT_FOUND))
    }

    fn summarize(
        &self,
        user: User,
        is_subscribed: bool,
        recipes_limit: Option<i64>,
    ) -> CoreResult<AuthorSummary> {
        let recipes = self.store.recipes_by_author(user.id, recipes_limit)?;
        let recipes_count = self.store.count_by_author(user.id)?;
        Ok(AuthorSummary {
            user,
            is_subscribed,
            recipes,
            recipes_count,
        })
    }
}
