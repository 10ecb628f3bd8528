pub mod document;
pub mod models;
