//! Structured error types for the layout engine.
//!
//! Most layout problems are recovered internally: a part taller than its
//! height constraint makes the sizer fall back to an area search, a missing
//! part image degrades to a placeholder box. The variants here are the cases
//! that escape to the caller, plus the internal `TooTall` signal the sizer
//! uses between its own layers.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// JSON input failed to parse as a valid layout job.
    #[error("failed to parse layout job: {source}{hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A single part is taller than the packer's height constraint.
    ///
    /// Distinguished so the constraint search can recover by switching
    /// strategy instead of silently overflowing the column.
    #[error("part `{part}` is {height:.0}px tall, exceeding the {constraint:.0}px height constraint")]
    TooTall {
        part: String,
        height: f64,
        constraint: f64,
    },

    /// Placement directives reference each other in a cycle.
    #[error("placement references form a cycle through `{id}`")]
    CyclicPlacement { id: String },

    /// The page tree is structurally invalid. Fails the page, never the
    /// process.
    #[error("malformed page tree: {0}")]
    MalformedTree(String),

    /// A placement directive names an element absent from the page.
    ///
    /// The composer repairs these to the page root with a warning; the
    /// variant surfaces only through strict graph resolution.
    #[error("`{id}` is placed relative to unknown element `{reference}`")]
    UnknownReference { id: String, reference: String },

    /// An RGBA buffer does not match its declared dimensions.
    #[error("image data for `{id}` does not match the declared {width}x{height} size")]
    BadImageData { id: String, width: u32, height: u32 },

    /// Layout output could not be serialized.
    #[error("failed to serialize composed layout: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LayoutError {
    /// Wrap a JSON parse failure with a category-specific hint, the same
    /// treatment the CLI gives malformed input.
    pub fn parse(source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but doesn't match the layout job schema. Check field names and types."
            }
            serde_json::error::Category::Eof => {
                "\n  Hint: unexpected end of input; is the JSON truncated?"
            }
            serde_json::error::Category::Io => "",
        };
        LayoutError::Parse {
            source,
            hint: hint.to_string(),
        }
    }
}
