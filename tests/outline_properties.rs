//! Property and scenario tests for the heuristic outline extractor.

use deckify::heuristic_outline;

/// Inputs meant to poke at the extractor's totality.
fn awkward_inputs() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        "\n\n\n".to_string(),
        "no markdown at all".to_string(),
        "# only a heading".to_string(),
        "####### seven hashes is not a heading".to_string(),
        "```\nfence never closed".to_string(),
        "![img](a.png)\n![img](b.png)".to_string(),
        "héllo wörld. ünicode everywhere! 日本語のテキストもある。".to_string(),
        "- \n* \n• ".to_string(),
        "word ".repeat(5000),
        "# H\n".repeat(100),
        "a.b.c.d.e.f".to_string(),
    ]
}

#[test]
fn outline_bounds_hold_for_all_inputs() {
    for input in awkward_inputs() {
        let outline = heuristic_outline(&input, "", false);
        assert!(
            (1..=30).contains(&outline.slides.len()),
            "slide count {} out of bounds for {:?}",
            outline.slides.len(),
            &input[..input.len().min(40)]
        );
        assert_eq!(outline.estimated_slide_count, outline.slides.len());

        for slide in &outline.slides {
            assert!(slide.bullets.len() <= 6);
            assert!(slide.title.chars().count() <= 80);
            for bullet in &slide.bullets {
                assert!(bullet.chars().count() <= 120);
            }
            assert_eq!(slide.layout, "auto");
            assert!(slide.notes.is_none());
        }
    }
}

#[test]
fn outline_is_idempotent() {
    for input in awkward_inputs() {
        let a = heuristic_outline(&input, "steady", true);
        let b = heuristic_outline(&input, "steady", true);
        assert_eq!(a, b);
    }
}

#[test]
fn headings_take_priority_over_chunking() {
    let text = "# Roadmap\n- ship the parser\n- write docs\n";
    let outline = heuristic_outline(text, "", false);
    assert_eq!(outline.slides[0].title, "Roadmap");
    assert!(!outline.slides[0].title.starts_with("Section"));
}

#[test]
fn headingless_prose_is_chunked_not_overviewed() {
    let text = "This is plain prose with no structure. It keeps going for a while. \
                Every sentence adds a little more. Eventually it should be chunked. \
                The extractor must never emit an Overview slide here."
        .to_string();
    let outline = heuristic_outline(&text, "", false);
    for (i, slide) in outline.slides.iter().enumerate() {
        assert_eq!(slide.title, format!("Section {}", i + 1));
        assert_ne!(slide.title, "Overview");
    }
}

#[test]
fn image_and_link_syntax_is_stripped() {
    let text = "# Links\n![alt](x.png) See [docs](http://x) for more";
    let outline = heuristic_outline(text, "", false);
    let bullet = &outline.slides[0].bullets[0];
    assert_eq!(bullet, "See docs for more");
    assert!(!bullet.contains("!["));
    assert!(!bullet.contains("]("));
}

#[test]
fn guidance_feeds_the_deck_title() {
    let outline = heuristic_outline("body", "Q3 Review", false);
    assert_eq!(outline.title, "Generated Presentation – Q3 Review");

    let outline = heuristic_outline("body", "", false);
    assert_eq!(outline.title, "Generated Presentation");
}

#[test]
fn three_headings_two_bullets_each() {
    let text = "# Alpha\nfirst point\nsecond point\n\
                # Beta\nfirst point\nsecond point\n\
                # Gamma\nfirst point\nsecond point\n";
    let outline = heuristic_outline(text, "", false);

    assert_eq!(outline.slides.len(), 3);
    let titles: Vec<_> = outline.slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    for slide in &outline.slides {
        assert_eq!(slide.bullets.len(), 2);
        assert_eq!(slide.bullets, vec!["first point", "second point"]);
    }
}

#[test]
fn three_hundred_words_make_three_sections() {
    // 30 sentences of 10 words each: 300 / 85 = 3 target slides.
    let sentence = "alpha beta gamma delta epsilon zeta eta theta iota kappa. ";
    let text = sentence.repeat(30);
    let outline = heuristic_outline(&text, "", false);

    assert_eq!(outline.slides.len(), 3);
    let titles: Vec<_> = outline.slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Section 1", "Section 2", "Section 3"]);
}

#[test]
fn notes_flag_controls_notes_presence() {
    let with = heuristic_outline("# A\n- b", "", true);
    assert!(with.slides.iter().all(|s| s.notes.as_deref() == Some("")));

    let without = heuristic_outline("# A\n- b", "", false);
    assert!(without.slides.iter().all(|s| s.notes.is_none()));
}

#[test]
fn json_shape_matches_contract() {
    let outline = heuristic_outline("# A\n- b", "focus", true);
    let json: serde_json::Value = serde_json::from_str(&outline.to_json().unwrap()).unwrap();

    assert!(json["title"].is_string());
    assert!(json["slides"].is_array());
    assert!(json["estimated_slide_count"].is_u64());
    let slide = &json["slides"][0];
    assert!(slide["title"].is_string());
    assert!(slide["bullets"].is_array());
    assert_eq!(slide["layout"], "auto");
    assert_eq!(slide["notes"], "");
}
