use identity_domain::query::NameMatch;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Select,
    sea_query::{LikeExpr, SimpleExpr},
};

/// Escape character used in generated `LIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Escape `LIKE` metacharacters so `prefix` matches literally.
pub fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// SQL condition for `name` against `column`.
pub fn name_condition<C>(column: C, name: &NameMatch) -> SimpleExpr
where
    C: ColumnTrait,
{
    match name {
        NameMatch::Equals(value) => column.eq(value.as_str()),
        NameMatch::StartsWith(prefix) => column.like(
            LikeExpr::new(format!("{}%", escape_like(prefix))).escape(LIKE_ESCAPE),
        ),
    }
}

pub trait FilterByName {
    fn filter_by_name<C: ColumnTrait>(self, column: C, name: &NameMatch) -> Self;
}

impl<E> FilterByName for Select<E>
where
    E: EntityTrait,
{
    fn filter_by_name<C: ColumnTrait>(self, column: C, name: &NameMatch) -> Self {
        self.filter(name_condition(column, name))
    }
}
