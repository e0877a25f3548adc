//! Upstream entity source: the Overpass API.
//!
//! The session only sees the [`EntitySource`] trait. This module provides the
//! raw entity model it returns, the Overpass query and response schema, and two
//! implementations:
//!
//! - [`OverpassSource`] - POSTs a query to an Overpass endpoint over HTTP
//! - [`StaticSource`] - returns a fixed list (saved responses, tests)
//!
//! # Example
//!
//! ```ignore
//! use zonemap::overpass::{EntitySource, OverpassSource, ReqwestClient};
//!
//! let source = OverpassSource::new(ReqwestClient::new()?, DEFAULT_OVERPASS_ENDPOINT, 25);
//! let entities = source.fetch(bounds).await?;
//! ```

mod http;
mod model;
mod query;
mod response;
mod source;

pub use http::{HttpClient, ReqwestClient};
pub use model::{tags, EntityId, EntityKind, Member, RawEntity, Tags};
pub use query::{build_query, BAN_PREDICATES};
pub use response::parse_entities;
pub use source::{EntitySource, OverpassSource, StaticSource, DEFAULT_OVERPASS_ENDPOINT};

#[cfg(test)]
pub use http::tests::MockHttpClient;
