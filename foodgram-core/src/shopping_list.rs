//! Consolidated shopping list for everything in a user's cart.

use crate::error::{CoreError, CoreResult};
use crate::store::RecipeRepository;
use crate::types::{CartLine, CurrentUser, ShoppingListItem};
use std::collections::BTreeMap;
use std::fmt::Write;

pub const SHOPPING_LIST_HEADER: &str = "Список покупок:";

pub struct ShoppingListAggregator<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ShoppingListAggregator<'a, S>
where
    S: RecipeRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn build(&self, user: &CurrentUser) -> CoreResult<Vec<ShoppingListItem>> {
        let user_id = user.id.ok_or(CoreError::Unauthorized)?;
        let lines = self.store.cart_lines(user_id)?;
        Ok(aggregate(lines))
    }

    pub fn report(&self, user: &CurrentUser) -> CoreResult<String> {
        Ok(render_shopping_list(&self.build(user)?))
    }
}

/// Groups by (name, unit), not by ingredient id: two catalog entries sharing
/// a name and unit end up on one line. Sorted by name, then unit.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals.entry((line.name, line.unit)).or_insert(0) += i64::from(line.amount);
    }

    totals
        .into_iter()
        .map(|((name, unit), total_amount)| ShoppingListItem {
            name,
            unit,
            total_amount,
        })
        .collect()
}

/// Plain-text report: header, blank line, then `N. name(unit) - total`.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut report = format!("{}\n\n", SHOPPING_LIST_HEADER);
    for (index, item) in items.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            report,
            "{}. {}({}) - {}",
            index + 1,
            item.name,
            item.unit,
            item.total_amount
        );
    }
    report
}
