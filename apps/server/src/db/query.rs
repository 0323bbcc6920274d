//! SQL fragments shared by the backend stores.

use crate::models::{DishFilter, SortField};

pub(crate) const DISH_COLUMNS: &str = "id, name, description, created_at, updated_at";

pub(crate) const USER_COLUMNS: &str =
    "id, email, hashed_password, is_active, is_superuser, is_verified, name, created_at, updated_at";

/// Build a `LIKE` pattern matching `search` as a literal substring.
///
/// `\` is the escape character; pair with `ESCAPE '\'` in SQL.
pub(crate) fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `ORDER BY` body for a listing. Non-id keys get `id ASC` as tiebreaker so
/// that consecutive pages never overlap.
///
/// Both parts come from closed enums, never from request text.
pub(crate) fn order_clause(filter: &DishFilter) -> String {
    let column = filter.order_by.column();
    let direction = filter.direction.keyword();
    match filter.order_by {
        SortField::Id => format!("{column} {direction}"),
        _ => format!("{column} {direction}, id ASC"),
    }
}
