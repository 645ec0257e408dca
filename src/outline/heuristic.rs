//! Heuristic outline extraction.
//!
//! Maps raw text/markdown into a slide outline without any language model,
//! used whenever no credential is supplied or the remote strategy fails.
//! Headings are the strongest structural signal and take priority; a
//! document with no headings at all degrades to proportional sentence
//! chunking so slide density stays within a 60-110 words-per-slide band
//! instead of producing one giant slide.

use unicode_normalization::UnicodeNormalization;

use super::markdown::{scan_blocks, MdBlock};
use crate::model::{Outline, Slide, MAX_BULLETS, MAX_BULLET_CHARS, MAX_SLIDES, MAX_TITLE_CHARS};

/// Words-per-slide target band (min, max); chunking aims at the midpoint.
const WORDS_PER_SLIDE: (usize, usize) = (60, 110);

/// Maximum slides the chunking fallback will target.
const MAX_CHUNKED_SLIDES: usize = 25;

/// Characters of guidance carried into the deck title.
const MAX_GUIDANCE_CHARS: usize = 60;

/// NFC-normalize and collapse all whitespace runs to single spaces.
fn collapse_ws(s: &str) -> String {
    s.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse whitespace and truncate to `max` characters, ellipsis included.
pub(crate) fn truncate_text(s: &str, max: usize) -> String {
    let s = collapse_ws(s);
    if s.chars().count() <= max {
        s
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Count word-character tokens (runs of alphanumerics/underscores).
fn word_count(s: &str) -> usize {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .count()
}

/// Split collapsed text into sentences on `.`/`!`/`?` followed by a space.
fn split_sentences(collapsed: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = collapsed.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek() == Some(&' ') {
            chars.next();
            sentences.push(std::mem::take(&mut current));
        }
    }
    sentences.push(current);
    sentences
}

/// Remove `![alt](url)` image syntax entirely.
fn strip_images(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("![") {
        let after = &rest[start + 2..];
        match after.find("](").and_then(|mid| {
            after[mid + 2..].find(')').map(|end| start + 2 + mid + 2 + end + 1)
        }) {
            Some(skip) => {
                out.push_str(&rest[..start]);
                rest = &rest[skip..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Replace `[label](url)` link syntax with just the label.
fn strip_links(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find('[') {
        let after = &rest[start + 1..];
        match after.find("](").and_then(|mid| {
            after[mid + 2..]
                .find(')')
                .map(|end| (mid, start + 1 + mid + 2 + end + 1))
        }) {
            Some((label_len, skip)) => {
                out.push_str(&rest[..start]);
                out.push_str(&after[..label_len]);
                rest = &rest[skip..];
            }
            None => {
                out.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Turn a raw content line into a bullet candidate: drop images, reduce
/// links to their labels, shed leading list markers.
fn bullet_text(line: &str) -> String {
    let line = strip_links(&strip_images(line));
    let line = line.trim();
    let line = if line.starts_with(['-', '*', '•']) {
        line.trim_start_matches(['-', '*', '•', ' '])
    } else {
        line
    };
    truncate_text(line, MAX_BULLET_CHARS)
}

/// Current-slide accumulator for the token walk.
#[derive(Default)]
struct SlideAccumulator {
    title: String,
    bullets: Vec<String>,
}

impl SlideAccumulator {
    /// Emit the accumulated slide, if it holds anything, and reset.
    ///
    /// An accumulator with neither a title nor bullets is discarded; an
    /// untitled one falls back to "Overview".
    fn flush(&mut self, slides: &mut Vec<Slide>, include_notes: bool) {
        if !self.title.is_empty() || !self.bullets.is_empty() {
            let title = if self.title.is_empty() {
                "Overview".to_string()
            } else {
                std::mem::take(&mut self.title)
            };
            let mut bullets = std::mem::take(&mut self.bullets);
            bullets.truncate(MAX_BULLETS);
            let mut slide = Slide::new(title, bullets);
            if include_notes {
                slide = slide.with_notes("");
            }
            slides.push(slide);
        }
        self.title.clear();
        self.bullets.clear();
    }
}

/// Chunk heading-less prose into "Section N" slides, one per sentence
/// group, keeping slide density near the words-per-slide midpoint.
fn chunk_sentences(text: &str, include_notes: bool) -> Vec<Slide> {
    let collapsed = collapse_ws(text);
    let midpoint = (WORDS_PER_SLIDE.0 + WORDS_PER_SLIDE.1) / 2;
    let target = (word_count(&collapsed) / midpoint).clamp(1, MAX_CHUNKED_SLIDES);

    let sentences = split_sentences(&collapsed);
    let group_size = sentences.len().div_ceil(target).max(1);

    sentences
        .chunks(group_size)
        .enumerate()
        .map(|(i, group)| {
            let bullets: Vec<String> = group
                .iter()
                .map(|s| truncate_text(s, MAX_BULLET_CHARS))
                .filter(|s| !s.is_empty())
                .take(MAX_BULLETS)
                .collect();
            let mut slide = Slide::new(format!("Section {}", i + 1), bullets);
            if include_notes {
                slide = slide.with_notes("");
            }
            slide
        })
        .collect()
}

/// Derive a slide outline from raw text or markdown.
///
/// Never fails: any input string, including the empty string, yields a
/// structurally valid outline of 1 to 30 slides. The result is a pure
/// function of the arguments.
///
/// # Example
///
/// ```
/// use deckify::heuristic_outline;
///
/// let outline = heuristic_outline("# Agenda\n- intro\n- demo", "Q3 Review", false);
/// assert_eq!(outline.title, "Generated Presentation – Q3 Review");
/// assert_eq!(outline.slides[0].title, "Agenda");
/// assert_eq!(outline.slides[0].bullets, vec!["intro", "demo"]);
/// ```
pub fn heuristic_outline(text: &str, guidance: &str, include_notes: bool) -> Outline {
    let mut slides: Vec<Slide> = Vec::new();
    let mut acc = SlideAccumulator::default();

    for block in scan_blocks(text) {
        match block {
            MdBlock::Heading { text, .. } => {
                acc.flush(&mut slides, include_notes);
                acc.title = truncate_text(&text, MAX_TITLE_CHARS);
            }
            MdBlock::Line(line) => {
                acc.bullets.push(bullet_text(&line));
            }
        }
    }
    acc.flush(&mut slides, include_notes);

    // No heading anywhere (all slides fell back to "Overview", or none were
    // produced at all): discard and chunk by sentence groups instead.
    if slides.iter().all(|s| s.title == "Overview") {
        slides = chunk_sentences(text, include_notes);
    }

    let title = if guidance.is_empty() {
        "Generated Presentation".to_string()
    } else {
        let guidance: String = guidance.chars().take(MAX_GUIDANCE_CHARS).collect();
        format!("Generated Presentation – {}", guidance)
    };

    slides.truncate(MAX_SLIDES);
    Outline::new(title, slides)
}
