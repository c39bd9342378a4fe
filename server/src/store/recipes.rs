use super::{missing_parent_error, store_error, PgStore};
use crate::models::{
    NewRecipe, NewRecipeIngredient, NewRecipeMark, NewRecipeTag, RecipeChanges, RecipeRow,
    RecipeSummaryRow, TagRow, UserRow,
};
use crate::schema::{
    ingredients, recipe_ingredients, recipe_marks, recipe_tags, recipes, subscriptions, tags,
    users,
};
use diesel::dsl::{exists, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use foodgram_core::{
    CartLine, IngredientAmount, Mark, MarkKind, Recipe, RecipeFilter, RecipeId,
    RecipeIngredientView, RecipeRepository, RecipeSummary, RecipeView, StoreError, StoreResult,
    Tag, UserId, ValidatedRecipe,
};
use std::collections::HashMap;
use uuid::Uuid;

fn write_children(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    recipe: &ValidatedRecipe,
) -> QueryResult<()> {
    let lines: Vec<NewRecipeIngredient> = recipe
        .ingredients
        .iter()
        .map(|line| NewRecipeIngredient {
            recipe_id,
            ingredient_id: line.id,
            amount: line.amount,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&lines)
        .execute(conn)?;

    let tag_links: Vec<NewRecipeTag> = recipe
        .tags
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&tag_links)
        .execute(conn)?;

    Ok(())
}

/// Loads tags and ingredient lines for a batch of recipe rows in two queries.
fn with_children(conn: &mut PgConnection, rows: Vec<RecipeRow>) -> QueryResult<Vec<Recipe>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let tag_links: Vec<(Uuid, i32)> = recipe_tags::table
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .order((recipe_tags::recipe_id, recipe_tags::tag_id))
        .select((recipe_tags::recipe_id, recipe_tags::tag_id))
        .load(conn)?;
    let lines: Vec<(Uuid, i32, i32)> = recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .order((recipe_ingredients::recipe_id, recipe_ingredients::ingredient_id))
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::ingredient_id,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    let mut tags_by_recipe: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for (recipe_id, tag_id) in tag_links {
        tags_by_recipe.entry(recipe_id).or_default().push(tag_id);
    }
    let mut lines_by_recipe: HashMap<Uuid, Vec<IngredientAmount>> = HashMap::new();
    for (recipe_id, id, amount) in lines {
        lines_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(IngredientAmount { id, amount });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let tags = tags_by_recipe.remove(&row.id).unwrap_or_default();
            let lines = lines_by_recipe.remove(&row.id).unwrap_or_default();
            row.into_recipe(tags, lines)
        })
        .collect())
}

fn load_recipe(conn: &mut PgConnection, id: RecipeId) -> QueryResult<Recipe> {
    let row: RecipeRow = recipes::table
        .find(id)
        .select(RecipeRow::as_select())
        .first(conn)?;
    with_children(conn, vec![row])?
        .pop()
        .ok_or(DieselError::NotFound)
}

/// Ids of the recipes `viewer` has marked with `kind`, for use as a subselect.
fn marked_recipes(
    viewer: UserId,
    kind: MarkKind,
) -> recipe_marks::BoxedQuery<'static, Pg, diesel::sql_types::Uuid> {
    recipe_marks::table
        .filter(recipe_marks::user_id.eq(viewer))
        .filter(recipe_marks::kind.eq(kind.as_str()))
        .select(recipe_marks::recipe_id)
        .into_boxed()
}

/// Recipes matching `filter`, unordered and unpaginated.
fn filtered_recipes(
    filter: &RecipeFilter,
    viewer: Option<UserId>,
) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if !filter.tags.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(filter.tags.clone()))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }

    if let Some(viewer) = viewer {
        for (kind, wanted) in [
            (MarkKind::Favorite, filter.is_favorited),
            (MarkKind::ShoppingCart, filter.is_in_shopping_cart),
        ] {
            match wanted {
                Some(true) => {
                    query = query.filter(recipes::id.eq_any(marked_recipes(viewer, kind)));
                }
                Some(false) => {
                    query = query.filter(not(recipes::id.eq_any(marked_recipes(viewer, kind))));
                }
                None => {}
            }
        }
    }

    query
}

impl RecipeRepository for PgStore {
    fn create(&self, author_id: UserId, recipe: &ValidatedRecipe) -> StoreResult<Recipe> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DieselError, _>(|conn| {
            let row: RecipeRow = diesel::insert_into(recipes::table)
                .values(&NewRecipe {
                    author_id,
                    name: &recipe.name,
                    image: &recipe.image,
                    text: &recipe.text,
                    cooking_time: recipe.cooking_time,
                })
                .returning(RecipeRow::as_returning())
                .get_result(conn)?;
            write_children(conn, row.id, recipe)?;
            load_recipe(conn, row.id)
        })
        .map_err(store_error)
    }

    fn update(&self, id: RecipeId, recipe: &ValidatedRecipe) -> StoreResult<Recipe> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DieselError, _>(|conn| {
            diesel::update(recipes::table.find(id))
                .set(&RecipeChanges {
                    name: &recipe.name,
                    image: &recipe.image,
                    text: &recipe.text,
                    cooking_time: recipe.cooking_time,
                })
                .returning(recipes::id)
                .get_result::<Uuid>(conn)?;

            diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)))
                .execute(conn)?;
            diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id)))
                .execute(conn)?;
            write_children(conn, id, recipe)?;
            load_recipe(conn, id)
        })
        .map_err(store_error)
    }

    fn delete(&self, id: RecipeId) -> StoreResult<()> {
        let mut conn = self.conn()?;
        // Lines, tags and marks go with the row via ON DELETE CASCADE.
        let deleted = diesel::delete(recipes::table.find(id))
            .execute(&mut conn)
            .map_err(store_error)?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn get(&self, id: RecipeId) -> StoreResult<Recipe> {
        let mut conn = self.conn()?;
        load_recipe(&mut conn, id).map_err(store_error)
    }

    fn list(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<Vec<Recipe>> {
        let mut conn = self.conn()?;

        let mut query = filtered_recipes(filter, viewer)
            .select(RecipeRow::as_select())
            .order((recipes::pub_date.desc(), recipes::id.desc()));

        if let Some(limit) = filter.limit {
            query = query.limit(limit.max(0));
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset.max(0));
        }

        let rows: Vec<RecipeRow> = query.load(&mut conn).map_err(store_error)?;
        with_children(&mut conn, rows).map_err(store_error)
    }

    fn count(&self, filter: &RecipeFilter, viewer: Option<UserId>) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        filtered_recipes(filter, viewer)
            .count()
            .get_result(&mut conn)
            .map_err(store_error)
    }

    fn view(&self, recipe: &Recipe, viewer: Option<UserId>) -> StoreResult<RecipeView> {
        let mut conn = self.conn()?;

        let author: UserRow = users::table
            .find(recipe.author_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .map_err(store_error)?;

        let tag_rows: Vec<TagRow> = tags::table
            .filter(tags::id.eq_any(&recipe.tags))
            .order(tags::name.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .map_err(store_error)?;

        let ingredient_rows: Vec<(i32, String, String, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(recipe.id))
            .order(ingredients::name.asc())
            .select((
                ingredients::id,
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .map_err(store_error)?;

        let marks: Vec<String> = match viewer {
            Some(viewer) => recipe_marks::table
                .filter(recipe_marks::user_id.eq(viewer))
                .filter(recipe_marks::recipe_id.eq(recipe.id))
                .select(recipe_marks::kind)
                .load(&mut conn)
                .map_err(store_error)?,
            None => Vec::new(),
        };
        let marked = |kind: MarkKind| marks.iter().any(|m| m == kind.as_str());

        let author_subscribed = match viewer {
            Some(viewer) => diesel::select(exists(
                subscriptions::table.find((viewer, recipe.author_id)),
            ))
            .get_result(&mut conn)
            .map_err(store_error)?,
            None => false,
        };

        Ok(RecipeView {
            id: recipe.id,
            author: author.into(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            text: recipe.text.clone(),
            pub_date: recipe.pub_date,
            cooking_time: recipe.cooking_time,
            tags: tag_rows.into_iter().map(Tag::from).collect(),
            ingredients: ingredient_rows
                .into_iter()
                .map(|(id, name, measurement_unit, amount)| RecipeIngredientView {
                    id,
                    name,
                    measurement_unit,
                    amount,
                })
                .collect(),
            is_favorited: marked(MarkKind::Favorite),
            is_in_shopping_cart: marked(MarkKind::ShoppingCart),
            author_subscribed,
        })
    }

    fn recipes_by_author(
        &self,
        author_id: UserId,
        limit: Option<i64>,
    ) -> StoreResult<Vec<RecipeSummary>> {
        let mut conn = self.conn()?;
        let mut query = recipes::table
            .filter(recipes::author_id.eq(author_id))
            .order((recipes::pub_date.desc(), recipes::id.desc()))
            .select(RecipeSummaryRow::as_select())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit.max(0));
        }
        let rows: Vec<RecipeSummaryRow> = query.load(&mut conn).map_err(store_error)?;
        Ok(rows.into_iter().map(RecipeSummary::from).collect())
    }

    fn count_by_author(&self, author_id: UserId) -> StoreResult<i64> {
        let mut conn = self.conn()?;
        recipes::table
            .filter(recipes::author_id.eq(author_id))
            .count()
            .get_result(&mut conn)
            .map_err(store_error)
    }

    fn has_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        diesel::select(exists(
            recipe_marks::table
                .filter(recipe_marks::user_id.eq(user_id))
                .filter(recipe_marks::recipe_id.eq(recipe_id))
                .filter(recipe_marks::kind.eq(kind.as_str())),
        ))
        .get_result(&mut conn)
        .map_err(store_error)
    }

    fn add_mark(&self, kind: MarkKind, user_id: UserId, recipe_id: RecipeId) -> StoreResult<Mark> {
        let mut conn = self.conn()?;
        diesel::insert_into(recipe_marks::table)
            .values(&NewRecipeMark {
                user_id,
                recipe_id,
                kind: kind.as_str(),
            })
            .execute(&mut conn)
            .map_err(missing_parent_error)?;
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
        let mut conn = self.conn()?;
        let removed = diesel::delete(
            recipe_marks::table
                .filter(recipe_marks::user_id.eq(user_id))
                .filter(recipe_marks::recipe_id.eq(recipe_id))
                .filter(recipe_marks::kind.eq(kind.as_str())),
        )
        .execute(&mut conn)
        .map_err(store_error)?;
        Ok(removed > 0)
    }

    fn cart_lines(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        let mut conn = self.conn()?;
        let rows: Vec<(String, String, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(
                recipe_ingredients::recipe_id
                    .eq_any(marked_recipes(user_id, MarkKind::ShoppingCart)),
            )
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, unit, amount)| CartLine { name, unit, amount })
            .collect())
    }

    fn assign_short_link(&self, recipe_id: RecipeId, token: &str) -> StoreResult<String> {
        let mut conn = self.conn()?;

        // Only claims the slot while it is empty, so an existing token always wins.
        let claimed: Option<Option<String>> = diesel::update(
            recipes::table
                .find(recipe_id)
                .filter(recipes::short_link.is_null()),
        )
        .set(recipes::short_link.eq(token))
        .returning(recipes::short_link)
        .get_result(&mut conn)
        .optional()
        .map_err(store_error)?;

        if let Some(Some(stored)) = claimed {
            return Ok(stored);
        }

        let existing: Option<String> = recipes::table
            .find(recipe_id)
            .select(recipes::short_link)
            .first(&mut conn)
            .map_err(store_error)?;
        existing.ok_or_else(|| {
            StoreError::Backend(format!("short link for recipe {} was not stored", recipe_id))
        })
    }

    fn resolve_short_link(&self, token: &str) -> StoreResult<Option<RecipeId>> {
        let mut conn = self.conn()?;
        recipes::table
            .filter(recipes::short_link.eq(token))
            .select(recipes::id)
            .first(&mut conn)
            .optional()
            .map_err(store_error)
    }
}
