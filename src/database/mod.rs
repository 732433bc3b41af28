pub mod drinks;
pub mod manager;
pub mod models;
