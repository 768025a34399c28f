pub mod api_index;
pub mod generator;
pub mod project;
pub mod request;
