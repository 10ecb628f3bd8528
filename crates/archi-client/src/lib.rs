pub mod api;
pub mod feed;
pub mod suggestions;
pub mod view;
