use super::{store_error, PgStore};
use crate::models::{IngredientRow, TagRow};
use crate::schema::{ingredients, tags};
use diesel::dsl::exists;
use diesel::prelude::*;
use foodgram_core::{CatalogStore, Ingredient, IngredientId, StoreResult, Tag, TagId};

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

impl CatalogStore for PgStore {
    fn ingredient_exists(&self, id: IngredientId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        diesel::select(exists(ingredients::table.find(id)))
            .get_result(&mut conn)
            .map_err(store_error)
    }

    fn tag_exists(&self, id: TagId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        diesel::select(exists(tags::table.find(id)))
            .get_result(&mut conn)
            .map_err(store_error)
    }

    fn ingredients_by_prefix(&self, prefix: &str) -> StoreResult<Vec<Ingredient>> {
        let mut conn = self.conn()?;
        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::name.like(like_prefix(prefix)))
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    fn ingredient(&self, id: IngredientId) -> StoreResult<Option<Ingredient>> {
        let mut conn = self.conn()?;
        let row: Option<IngredientRow> = ingredients::table
            .find(id)
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Ingredient::from))
    }

    fn tags(&self) -> StoreResult<Vec<Tag>> {
        let mut conn = self.conn()?;
        let rows: Vec<TagRow> = tags::table
            .order(tags::name.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    fn tag(&self, id: TagId) -> StoreResult<Option<Tag>> {
        let mut conn = self.conn()?;
        let row: Option<TagRow> = tags::table
            .find(id)
            .select(TagRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(Tag::from))
    }
}
