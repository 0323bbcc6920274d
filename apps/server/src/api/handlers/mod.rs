pub mod auth;
pub mod dishes;
pub mod health;
pub mod users;
