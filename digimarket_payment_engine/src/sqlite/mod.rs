//! SQLite database module for the Digimarket payment engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
