//! Static JSX-to-HTML transpiler for sandboxed component previews.
//!
//! This crate converts the JSX returned by a single generated component into
//! plain HTML without executing any script. It recovers structure by textual
//! scanning, replaces dynamic expressions with placeholders, and always
//! produces a renderable document, falling back to a diagnostic page when the
//! source cannot be previewed.

pub mod attributes;
pub mod document;
pub mod escape;
pub mod extract;
pub mod render;
pub mod scan;
pub mod sources;
pub mod transpiler;

pub use attributes::{parse_attributes, translate_attributes, translate_style, Attribute, PropValue};
pub use document::DEFAULT_STYLESHEET;
pub use escape::escape_html;
pub use extract::{extract_fragment, Extraction};
pub use render::{render, MAX_DEPTH, PLACEHOLDER_HTML};
pub use scan::scan_balanced;
pub use sources::{SourceError, SourceSet, ENTRY_CANDIDATES};
pub use transpiler::{
    convert, Conversion, ConversionOutcome, ConvertError, TranspileOptions, Transpiler,
};
