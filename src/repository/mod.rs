pub mod item;
pub mod sale;
