//! Deck building against synthetic in-memory templates.

use std::io::{Cursor, Read, Write};

use deckify::{build_deck, heuristic_outline, Outline, Slide};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a minimal but well-formed template package.
///
/// `with_slide_list` controls whether presentation.xml carries an existing
/// (empty) p:sldIdLst; a bare .potx may not.
fn synthetic_template(with_media: bool, with_slide_list: bool) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#,
    )
    .unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
    )
    .unwrap();

    zip.start_file("ppt/presentation.xml", options).unwrap();
    let presentation = if with_slide_list {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
    } else {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
    };
    zip.write_all(presentation.as_bytes()).unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", options)
        .unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
</Relationships>"#,
    )
    .unwrap();

    for (i, name) in [(1, "Title Slide"), (2, "Title and Content"), (3, "Two Content")] {
        zip.start_file(format!("ppt/slideLayouts/slideLayout{}.xml", i), options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld name="{}"><p:spTree/></p:cSld></p:sldLayout>"#,
                name
            )
            .as_bytes(),
        )
        .unwrap();
    }

    if with_media {
        zip.start_file("ppt/media/image1.png", options).unwrap();
        zip.write_all(b"\x89PNG\r\n\x1a\nfakepng").unwrap();
    }

    zip.finish().unwrap();
    buffer
}

fn read_part(deck: &[u8], path: &str) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(deck.to_vec())).unwrap();
    let mut file = archive.by_name(path).ok()?;
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    Some(out)
}

fn part_exists(deck: &[u8], path: &str) -> bool {
    let mut archive = zip::ZipArchive::new(Cursor::new(deck.to_vec())).unwrap();
    let exists = archive.by_name(path).is_ok();
    exists
}

fn two_slide_outline() -> Outline {
    Outline::new(
        "Generated Presentation",
        vec![
            Slide::new("Intro", vec!["first".into(), "second".into()]),
            Slide::new("Detail", vec!["third".into()]),
        ],
    )
}

#[test]
fn appends_title_and_content_slides() {
    let template = synthetic_template(true, true);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();

    // Title slide + two content slides.
    let slide1 = read_part(&deck, "ppt/slides/slide1.xml").unwrap();
    assert!(slide1.contains("Generated Presentation"));

    let slide2 = read_part(&deck, "ppt/slides/slide2.xml").unwrap();
    assert!(slide2.contains("Intro"));
    assert!(slide2.contains("first"));
    assert!(slide2.contains("second"));

    let slide3 = read_part(&deck, "ppt/slides/slide3.xml").unwrap();
    assert!(slide3.contains("Detail"));

    assert!(read_part(&deck, "ppt/slides/slide4.xml").is_none());
}

#[test]
fn registers_slides_in_manifests() {
    let template = synthetic_template(false, true);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();

    let content_types = read_part(&deck, "[Content_Types].xml").unwrap();
    assert_eq!(content_types.matches("presentationml.slide+xml").count(), 3);

    let presentation = read_part(&deck, "ppt/presentation.xml").unwrap();
    assert_eq!(presentation.matches("<p:sldId ").count(), 3);

    let rels = read_part(&deck, "ppt/_rels/presentation.xml.rels").unwrap();
    assert_eq!(rels.matches("relationships/slide\"").count(), 3);
}

#[test]
fn creates_slide_list_when_template_has_none() {
    let template = synthetic_template(false, false);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();

    let presentation = read_part(&deck, "ppt/presentation.xml").unwrap();
    assert!(presentation.contains("<p:sldIdLst>"));
    assert_eq!(presentation.matches("<p:sldId ").count(), 3);
    // Schema order: the list follows the master list.
    let masters = presentation.find("</p:sldMasterIdLst>").unwrap();
    let slides = presentation.find("<p:sldIdLst>").unwrap();
    assert!(slides > masters);
}

#[test]
fn template_media_is_reused_on_content_slides() {
    let template = synthetic_template(true, true);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();

    // The title slide carries no picture; content slides do.
    let slide1 = read_part(&deck, "ppt/slides/slide1.xml").unwrap();
    assert!(!slide1.contains("<p:pic>"));

    let slide2 = read_part(&deck, "ppt/slides/slide2.xml").unwrap();
    assert!(slide2.contains("<p:pic>"));

    let rels2 = read_part(&deck, "ppt/slides/_rels/slide2.xml.rels").unwrap();
    assert!(rels2.contains("../media/image1.png"));

    // Original media survives the rewrite.
    assert!(part_exists(&deck, "ppt/media/image1.png"));
}

#[test]
fn no_media_means_no_pictures() {
    let template = synthetic_template(false, true);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();
    let slide2 = read_part(&deck, "ppt/slides/slide2.xml").unwrap();
    assert!(!slide2.contains("<p:pic>"));
}

#[test]
fn layout_hint_resolves_to_named_layout() {
    let template = synthetic_template(false, true);
    let mut outline = two_slide_outline();
    outline.slides[0].layout = "Two Content".to_string();
    let deck = build_deck(&outline, &template).unwrap();

    let rels = read_part(&deck, "ppt/slides/_rels/slide2.xml.rels").unwrap();
    assert!(rels.contains("slideLayout3.xml"));

    // The "auto" slide keeps the default content layout.
    let rels = read_part(&deck, "ppt/slides/_rels/slide3.xml.rels").unwrap();
    assert!(rels.contains("slideLayout2.xml"));
}

#[test]
fn title_slide_uses_title_layout() {
    let template = synthetic_template(false, true);
    let deck = build_deck(&two_slide_outline(), &template).unwrap();
    let rels = read_part(&deck, "ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(rels.contains("slideLayout1.xml"));
}

#[test]
fn notes_produce_notes_slides() {
    let template = synthetic_template(false, true);
    let outline = Outline::new(
        "Deck",
        vec![Slide::new("A", vec!["b".into()]).with_notes("remember this")],
    );
    let deck = build_deck(&outline, &template).unwrap();

    let notes = read_part(&deck, "ppt/notesSlides/notesSlide1.xml").unwrap();
    assert!(notes.contains("remember this"));

    let notes_rels = read_part(&deck, "ppt/notesSlides/_rels/notesSlide1.xml.rels").unwrap();
    assert!(notes_rels.contains("../slides/slide2.xml"));

    let slide_rels = read_part(&deck, "ppt/slides/_rels/slide2.xml.rels").unwrap();
    assert!(slide_rels.contains("../notesSlides/notesSlide1.xml"));

    let content_types = read_part(&deck, "[Content_Types].xml").unwrap();
    assert!(content_types.contains("notesSlide+xml"));
}

#[test]
fn special_characters_are_escaped() {
    let template = synthetic_template(false, true);
    let outline = Outline::new(
        "R&D <review>",
        vec![Slide::new("Q&A", vec!["profit > loss".into()])],
    );
    let deck = build_deck(&outline, &template).unwrap();

    let slide1 = read_part(&deck, "ppt/slides/slide1.xml").unwrap();
    assert!(slide1.contains("R&amp;D &lt;review&gt;"));

    let slide2 = read_part(&deck, "ppt/slides/slide2.xml").unwrap();
    assert!(slide2.contains("profit &gt; loss"));
}

#[test]
fn heuristic_pipeline_end_to_end() {
    let template = synthetic_template(true, true);
    let outline = heuristic_outline("# One\n- a\n\n# Two\n- b", "demo", false);
    let deck = deckify::build_deck(&outline, &template).unwrap();

    let slide1 = read_part(&deck, "ppt/slides/slide1.xml").unwrap();
    assert!(slide1.contains("Generated Presentation – demo"));
    assert!(read_part(&deck, "ppt/slides/slide3.xml").is_some());
}

#[test]
fn non_zip_template_is_rejected() {
    let outline = two_slide_outline();
    assert!(build_deck(&outline, b"definitely not a zip").is_err());
}

#[test]
fn template_without_layouts_is_rejected() {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<Types></Types>").unwrap();
    zip.finish().unwrap();

    let err = build_deck(&two_slide_outline(), &buffer).unwrap_err();
    assert!(matches!(err, deckify::Error::MissingComponent(_)));
}
