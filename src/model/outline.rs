//! Outline and slide value objects.

use serde::{Deserialize, Serialize};

/// Maximum number of slides in an outline.
pub const MAX_SLIDES: usize = 30;

/// Maximum number of bullets per slide.
pub const MAX_BULLETS: usize = 6;

/// Maximum characters per bullet (ellipsis included when truncated).
pub const MAX_BULLET_CHARS: usize = 120;

/// Maximum characters per slide title (ellipsis included when truncated).
pub const MAX_TITLE_CHARS: usize = 80;

fn default_layout() -> String {
    "auto".to_string()
}

/// A single content slide: a title, up to six bullets, a free-form layout
/// hint ("auto" by default) and optional speaker notes.
///
/// `notes` is `Some` (possibly empty) exactly when the caller asked for
/// notes; it is omitted from JSON otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide title.
    pub title: String,

    /// Bullet lines, in order.
    #[serde(default)]
    pub bullets: Vec<String>,

    /// Layout hint resolved by the deck builder at render time.
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Speaker notes, present only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Slide {
    /// Create a slide with the given title and bullets.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            title: title.into(),
            bullets,
            layout: default_layout(),
            notes: None,
        }
    }

    /// Attach empty speaker notes (marks the slide as notes-carrying).
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The structured slide plan produced before rendering.
///
/// Invariants (enforced by both outline strategies):
/// - `slides.len() <= 30` and `estimated_slide_count == slides.len()`;
/// - every slide carries at most 6 bullets of at most 120 characters;
/// - slide titles are at most 80 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Deck title.
    pub title: String,

    /// Ordered slides.
    #[serde(default)]
    pub slides: Vec<Slide>,

    /// Number of slides after truncation; always equals `slides.len()`.
    pub estimated_slide_count: usize,
}

impl Outline {
    /// Create an outline from a title and slides, capping the slide list
    /// and setting the estimated count.
    pub fn new(title: impl Into<String>, mut slides: Vec<Slide>) -> Self {
        slides.truncate(MAX_SLIDES);
        let estimated_slide_count = slides.len();
        Self {
            title: title.into(),
            slides,
            estimated_slide_count,
        }
    }

    /// Clamp an outline of unknown provenance to the model invariants.
    ///
    /// The heuristic strategy produces compliant outlines by construction;
    /// this is applied to remotely generated outlines, which are parsed from
    /// model output and may exceed the caps or carry stray notes fields.
    pub fn enforce_limits(mut self, include_notes: bool) -> Self {
        self.slides.truncate(MAX_SLIDES);
        for slide in &mut self.slides {
            slide.title = crate::outline::truncate_text(&slide.title, MAX_TITLE_CHARS);
            slide.bullets.truncate(MAX_BULLETS);
            for bullet in &mut slide.bullets {
                *bullet = crate::outline::truncate_text(bullet, MAX_BULLET_CHARS);
            }
            if slide.layout.is_empty() {
                slide.layout = default_layout();
            }
            slide.notes = if include_notes {
                Some(slide.notes.take().unwrap_or_default())
            } else {
                None
            };
        }
        self.estimated_slide_count = self.slides.len();
        self
    }

    /// Convert to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to compact JSON.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
