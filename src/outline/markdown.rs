//! Minimal markdown block scanner.
//!
//! The heuristic strategy only needs the structural signal markdown
//! provides at the block level: which lines are headings and which lines
//! carry content. This scanner recognizes ATX and setext headings, skips
//! fenced code blocks and thematic breaks, and hands every other non-blank
//! line through verbatim (list markers included; the heuristic strips them
//! while building bullets).

/// A block-level markdown token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdBlock {
    /// A heading with its level (1-6) and raw inline text.
    Heading { level: u8, text: String },
    /// A non-blank content line: paragraph text or a list item, untrimmed
    /// of its markers.
    Line(String),
}

/// True for a fence opener/closer: three or more backticks or tildes.
fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Parse an ATX heading (`# ...` through `###### ...`).
///
/// Returns the level and the inline text with any space-separated closing
/// hash sequence removed, per the usual markdown rules.
fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let t = line.trim_start();
    let level = t.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &t[level..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let mut text = rest.trim();
    // Strip a closing hash run only when it stands alone after a space.
    let trailing = text.len() - text.trim_end_matches('#').len();
    if trailing > 0 {
        let head = &text[..text.len() - trailing];
        if head.is_empty() {
            text = "";
        } else if head.ends_with(' ') || head.ends_with('\t') {
            text = head.trim_end();
        }
    }
    Some((level as u8, text.to_string()))
}

/// True for a setext underline made of `=` (H1) or `-` (H2).
///
/// Requires at least two characters so a lone `-` stays a list marker.
fn setext_level(line: &str) -> Option<u8> {
    let t = line.trim();
    if t.len() >= 2 && t.chars().all(|c| c == '=') {
        Some(1)
    } else if t.len() >= 2 && t.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// True for a thematic break: three or more `*`, `_` or `-` (spaces
/// between the markers allowed).
fn is_thematic_break(line: &str) -> bool {
    let t: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    t.len() >= 3
        && (t.chars().all(|c| c == '*')
            || t.chars().all(|c| c == '_')
            || t.chars().all(|c| c == '-'))
}

/// Scan text into a block token stream.
pub fn scan_blocks(text: &str) -> Vec<MdBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_fence(line) {
            in_fence = !in_fence;
            i += 1;
            continue;
        }
        if in_fence {
            i += 1;
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            i += 1;
            continue;
        }

        if let Some((level, text)) = parse_atx_heading(line) {
            blocks.push(MdBlock::Heading { level, text });
            i += 1;
            continue;
        }

        // An underline run reached directly (no paragraph line consumed it
        // from above) is either a thematic break or literal text.
        if setext_level(trimmed).is_some() {
            if !is_thematic_break(trimmed) {
                blocks.push(MdBlock::Line(trimmed.to_string()));
            }
            i += 1;
            continue;
        }

        if is_thematic_break(trimmed) {
            i += 1;
            continue;
        }

        // A paragraph line immediately underlined by `===` or `---` is a
        // setext heading; list lines keep their own meaning.
        if !trimmed.starts_with(['-', '*', '•']) {
            if let Some(level) = lines.get(i + 1).and_then(|next| setext_level(next.trim())) {
                blocks.push(MdBlock::Heading {
                    level,
                    text: trimmed.to_string(),
                });
                i += 2;
                continue;
            }
        }

        blocks.push(MdBlock::Line(trimmed.to_string()));
        i += 1;
    }

    blocks
}
