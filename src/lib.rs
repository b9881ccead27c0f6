//! Coverforge turns a title/author/genre/template selection into a finished
//! book cover.
//!
//! The pipeline is explicitly staged:
//!
//! 1. **Generate**: [`ArtClient::generate`] builds a genre-conditioned prompt
//!    and fetches one background artwork image as a data URI
//! 2. **Edit**: [`EditorState`] holds the single working cover and applies
//!    validated whole-element text edits
//! 3. **Compose**: [`export_cover`] rasterizes background + text at the
//!    template's native pixel size and encodes a PNG
//! 4. **Persist**: [`CoverCatalog`] keeps the durable, newest-first list of
//!    saved covers behind a [`CatalogStore`] seam
//!
//! Evaluation and compositing are deterministic for a given input; all IO
//! (network, fonts, catalog) happens at the edges.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod compose;
pub mod decode;
pub mod editor;
pub mod error;
pub mod fonts;
pub mod generate;
pub mod model;
pub mod prompt;
pub mod share;
pub mod templates;

pub use catalog::{CatalogStore, CoverCatalog, JsonFileStore, MemoryStore};
pub use compose::{ExportedPng, PixelAnchor, export_cover, export_file_name, resolve_position};
pub use decode::{PreparedImage, decode_data_uri, decode_image, encode_data_uri, parse_data_uri};
pub use editor::{EditorState, Slot};
pub use error::{CoverforgeError, CoverforgeResult};
pub use fonts::{FontFamily, FontRegistry, TextBrushRgba8, TextLayoutEngine};
pub use generate::{ArtClient, DEFAULT_ENDPOINT, jpeg_data_uri};
pub use model::{BookCover, CoverData, TextElement, parse_hex_color};
pub use prompt::{Genre, build_prompt, request_aspect_ratio};
pub use share::mailto_draft;
pub use templates::{AspectRatio, TemplateDetails, TemplateKey};
