//! Rouman5 Content-Source Adapter
//!
//! This library implements a single content source for a comic-reading
//! application: it authenticates to the upstream API, lists/searches/
//! favorites comics, resolves chapter image URLs, and de-scrambles images
//! the service intentionally shuffles.
//!
//! # Architecture
//!
//! - [`codec`] - Envelope codec: per-call key derivation and AES-ECB
//!   decryption of every API payload
//! - [`scramble`] - Keyed-hash scramble decision and geometric
//!   recomposition recipes for shuffled page images
//! - [`domains`] - Immutable domain snapshot and the domain-refresh pipeline
//! - [`transport`] - `Transport` seam over the network (`reqwest` in
//!   production, mocks in tests)
//! - [`client`] - Authenticated API client: auth headers, status mapping,
//!   envelope decode
//! - [`catalog`] - Typed domain objects and parsers for catalog endpoints
//! - [`settings`] - Typed settings schema and locale string table
//! - [`ui`] - `SourceUi` seam for confirmation dialogs and toasts
//! - [`source`] - The [`RoumanSource`] adapter façade tying it together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod client;
pub mod codec;
pub mod domains;
mod protocol;
pub mod scramble;
pub mod settings;
pub mod source;
pub mod transport;
pub mod ui;

// Re-export commonly used types
pub use catalog::{Chapter, Comic, ComicDetails, ComicPage, FavoriteFolders, HomeSection};
pub use client::{ApiClient, ApiError, Session};
pub use codec::CodecError;
pub use domains::{DomainRefreshOutcome, DomainSnapshot};
pub use scramble::{Band, ImageRecipe, band_layout, scramble_bands};
pub use settings::{FavoriteOrder, Locale, SourceSettings};
pub use source::{ImageRequest, RefreshMode, RoumanSource, SortOrder};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use ui::{SilentUi, SourceUi};
