pub mod auth;
pub mod category;
pub mod item;
pub mod rack;
pub mod report;
pub mod sale;
pub mod user;
pub mod warehouse;
