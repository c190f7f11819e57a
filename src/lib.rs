// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod deck;
pub mod error;
pub mod history;
pub mod prng;
pub mod quotes;
pub mod records;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod share;
pub mod skill;
pub mod store;
pub mod ui;

pub use error::{Error, Result};
