use super::{missing_parent_error, store_error, PgStore};
use crate::models::{NewSubscription, UserRow};
use crate::schema::{subscriptions, users};
use diesel::dsl::exists;
use diesel::prelude::*;
use foodgram_core::{StoreResult, Subscription, SubscriptionRepository, User, UserId};

impl SubscriptionRepository for PgStore {
    fn is_subscribed(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        diesel::select(exists(
            subscriptions::table.find((subscriber_id, author_id)),
        ))
        .get_result(&mut conn)
        .map_err(store_error)
    }

    fn subscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<Subscription> {
        let mut conn = self.conn()?;
        diesel::insert_into(subscriptions::table)
            .values(&NewSubscription {
                subscriber_id,
                author_id,
            })
            .execute(&mut conn)
            .map_err(missing_parent_error)?;
        Ok(Subscription {
            subscriber_id,
            author_id,
        })
    }

    fn unsubscribe(&self, subscriber_id: UserId, author_id: UserId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let removed = diesel::delete(subscriptions::table.find((subscriber_id, author_id)))
            .execute(&mut conn)
            .map_err(store_error)?;
        Ok(removed > 0)
    }

    fn subscribed_authors(
        &self,
        subscriber_id: UserId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> StoreResult<Vec<User>> {
        let mut conn = self.conn()?;
        let followed = subscriptions::table
            .filter(subscriptions::subscriber_id.eq(subscriber_id))
            .select(subscriptions::author_id);

        let mut query = users::table
            .filter(users::id.eq_any(followed))
            .order(users::username.asc())
            .select(UserRow::as_select())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit.max(0));
        }
        if let Some(offset) = offset {
            query = query.offset(offset.max(0));
        }

        let rows: Vec<UserRow> = query.load(&mut conn).map_err(store_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
