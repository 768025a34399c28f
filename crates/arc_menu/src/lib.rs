#![warn(clippy::all, rust_2018_idioms)]

pub use app::App;

pub const APP_NAME: &str = "ArcMenu";

mod app;
pub mod data;
pub mod operation;
pub mod panels;
pub mod utils;
