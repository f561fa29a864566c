pub mod category;
pub mod item;
pub mod rack;
pub mod sale;
pub mod user;
pub mod warehouse;
