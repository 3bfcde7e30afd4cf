pub mod api;
mod entry;
mod health;

pub use entry::{API_PREFIX, app, router};
