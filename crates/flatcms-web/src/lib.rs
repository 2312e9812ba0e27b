//! flatcms web front end: routes, sessions and HTML views over
//! `flatcms-core`.

pub mod app;
pub mod error;
pub mod handlers;
pub mod session;
pub mod views;

pub use app::{router, AppState};
