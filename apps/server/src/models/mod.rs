//! Domain records and request payloads

pub mod dish;
pub mod user;

pub use dish::{
    Dish, DishFilter, DishListQuery, DishPatch, NewDish, SortDirection, SortField, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use user::{
    BearerResponse, LoginForm, NewUser, User, UserAdminUpdate, UserCreate, UserPatch, UserUpdate,
};
