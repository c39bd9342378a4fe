use super::{store_error, PgStore};
use crate::auth::hash_token;
use crate::models::UserRow;
use crate::schema::{sessions, users};
use chrono::Utc;
use diesel::prelude::*;
use foodgram_core::{CurrentUser, IdentityStore, StoreResult, User, UserId};

impl IdentityStore for PgStore {
    fn current_user(&self, token: Option<&str>) -> StoreResult<CurrentUser> {
        let Some(token) = token else {
            return Ok(CurrentUser::anonymous());
        };
        let mut conn = self.conn()?;
        let token_hash = hash_token(token);

        let user_id: Option<UserId> = sessions::table
            .inner_join(users::table)
            .filter(sessions::token_hash.eq(&token_hash))
            .filter(sessions::expires_at.gt(Utc::now()))
            .select(users::id)
            .first(&mut conn)
            .optional()
            .map_err(store_error)?;

        Ok(user_id.map_or_else(CurrentUser::anonymous, CurrentUser::authenticated))
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(User::from))
    }
}
