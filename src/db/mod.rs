mod assignments;
mod classes;
mod students;
mod subjects;
mod teachers;

pub use assignments::*;
pub use classes::*;
pub use students::*;
pub use subjects::*;
pub use teachers::*;

use sqlx::{Pool, Sqlite};

use crate::error::AppError;

/// Runs a `SELECT COUNT(*)` style query bound to a single id.
async fn any_rows(pool: &Pool<Sqlite>, sql: &str, id: i64) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(pool).await?;
    Ok(count > 0)
}

/// Substring pattern for `LIKE ? ESCAPE '\'`; `%` and `_` in the query match literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::from("%");
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
