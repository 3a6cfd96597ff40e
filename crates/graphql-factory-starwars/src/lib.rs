//! Star Wars sample schema built with `graphql-factory`.
//!
//! The roster, the `Character` interface with its `Human` and `Droid`
//! implementations, and an axum server exposing the schema at `/graphql`.

pub mod config;
pub mod data;
pub mod model;
pub mod observability;
pub mod schema;
pub mod server;

pub use model::{Character, Context, Episode, Species};
pub use schema::build_schema;
pub use server::{AppState, router};
