//! Marketplace catalog access.
//!
//! Turns user-supplied search URLs into [`FilterSpec`]s and fetches the
//! newest matching listings through a [`CatalogClient`].

pub mod client;
pub mod error;
pub mod filter;
pub mod item;

pub use {
    client::{CatalogClient, CatalogClientConfig, HttpCatalogClient},
    error::{Error, Result},
    filter::{FilterSpec, ParseError, parse_filter_url},
    item::Item,
};
