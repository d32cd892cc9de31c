//! Bridges to the media server's companion service.
//!
//! - [`http::HttpCatalogClient`] -- reqwest client implementing both
//!   [`CatalogAdapter`](curator_core::catalog::CatalogAdapter) and
//!   [`DeletionExecutor`](curator_core::catalog::DeletionExecutor).

pub mod http;
