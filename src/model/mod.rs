//! Data model for slide outlines.
//!
//! An [`Outline`] is the structured slide plan produced by either outline
//! strategy and consumed once by the deck builder. Both types are plain
//! serde value objects; nothing mutates them after creation.

mod outline;

pub use outline::{Outline, Slide, MAX_BULLETS, MAX_BULLET_CHARS, MAX_SLIDES, MAX_TITLE_CHARS};
