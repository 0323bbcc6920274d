//! Business logic layer
//!
//! Services sit between the transport and the stores. They are the only
//! place where storage outcomes (absence, unique violations) become named
//! business errors.

pub mod dish;
pub mod user;

pub use dish::DishService;
pub use user::UserService;
