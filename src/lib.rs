//! # deckify
//!
//! Turn free-form text and markdown into a PowerPoint deck rendered into an
//! existing template.
//!
//! The pipeline has two halves: an outline extractor that maps raw text to
//! a bounded slide plan, and a deck builder that renders the plan into an
//! uploaded .pptx/.potx template, reusing the template's layouts and
//! embedded images.
//!
//! ## Quick Start
//!
//! ```no_run
//! use deckify::heuristic_outline;
//!
//! // Derive an outline without any external service
//! let text = std::fs::read_to_string("notes.md")?;
//! let outline = heuristic_outline(&text, "Q3 Review", false);
//! println!("{} slides", outline.estimated_slide_count);
//!
//! // Render it into a template
//! let template = std::fs::read("template.pptx")?;
//! let deck = deckify::build_deck(&outline, &template)?;
//! std::fs::write("output.pptx", deck)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Outline strategies
//!
//! [`heuristic_outline`] is total over any input string and needs no
//! network: headings become slide titles, lines become bullets, and
//! heading-less prose is chunked into proportional "Section N" slides.
//!
//! With the `remote` feature (default), [`RemotePlanner`] delegates
//! planning to a language-model provider instead. It fails loudly on
//! transport or parse problems; callers fall back to the heuristic, which
//! is the system's universal safety net.
//!
//! ## Features
//!
//! - `remote` (default): language-model outline planning over HTTP.

pub mod deck;
pub mod error;
pub mod model;
pub mod outline;

// Re-exports
pub use deck::{build_deck, LayoutInfo, TemplateInventory, TemplatePackage};
pub use error::{Error, Result};
pub use model::{Outline, Slide};
pub use outline::heuristic_outline;

#[cfg(feature = "remote")]
pub use outline::{Provider, RemoteConfig, RemotePlanner};

/// Derive an outline heuristically and render it into the template in one
/// step. This is the no-credential path of the original service endpoint.
pub fn generate_deck(
    text: &str,
    guidance: &str,
    include_notes: bool,
    template_bytes: &[u8],
) -> Result<Vec<u8>> {
    let outline = heuristic_outline(text, guidance, include_notes);
    build_deck(&outline, template_bytes)
}
