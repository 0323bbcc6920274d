//! PostgreSQL stores

mod dishes;
mod tokens;
mod users;

pub use dishes::PostgresDishStore;
pub use tokens::PostgresAccessTokenStore;
pub use users::PostgresUserStore;
