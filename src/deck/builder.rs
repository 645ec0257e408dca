//! Deck assembly: render an outline into the template package.

use std::io::Write;

use quick_xml::escape::escape;

use super::template::{LayoutInfo, TemplateInventory, TemplatePackage};
use crate::error::{Error, Result};
use crate::model::Outline;

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const NOTES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_NOTES_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
const REL_NOTES_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";

/// Layouts tried for the leading title slide.
const TITLE_LAYOUTS: &[&str] = &["Title Slide", "Title Only", "Section Header", "Title"];

/// Layouts tried for content slides whose hint is "auto".
const AUTO_LAYOUTS: &[&str] = &[
    "Title and Content",
    "Content with Caption",
    "Two Content",
    "Picture with Caption",
    "Blank",
];

/// EMU geometry for images dropped outside a placeholder: a 3:2.25 inch
/// box on the right half of the slide (914400 EMUs per inch).
const PIC_OFFSET: (u64, u64) = (5_486_400, 1_371_600);
const PIC_EXTENT: (u64, u64) = (2_743_200, 2_057_400);

/// Render an outline into the template, returning the new package bytes.
///
/// Existing slides in the template are kept; the outline is appended as a
/// title slide followed by one slide per outline entry. Layout hints are
/// resolved against the template's own layout names and degrade to a
/// default layout when nothing matches.
pub fn build_deck(outline: &Outline, template_bytes: &[u8]) -> Result<Vec<u8>> {
    let package = TemplatePackage::from_bytes(template_bytes.to_vec())?;
    let inventory = TemplateInventory::scan(&package)?;
    if inventory.layouts.is_empty() {
        return Err(Error::MissingComponent("ppt/slideLayouts".to_string()));
    }

    let presentation = package.read_xml("ppt/presentation.xml")?;
    let presentation_rels = package.read_xml("ppt/_rels/presentation.xml.rels")?;
    let content_types = package.read_xml("[Content_Types].xml")?;

    let mut next_rid = max_relationship_id(&presentation_rels) + 1;
    let mut next_sld_id = max_slide_id(&presentation).max(255) + 1;
    let mut next_slide = inventory.max_slide_number + 1;
    let mut next_notes = inventory.max_notes_number + 1;
    let mut image_cursor = 0usize;

    let mut new_parts: Vec<(String, String)> = Vec::new();
    let mut sld_id_entries = String::new();
    let mut rel_entries = String::new();
    let mut override_entries = String::new();

    // Title slide first, then one content slide per outline entry.
    let title_layout = inventory
        .find_preferred_layout(TITLE_LAYOUTS)
        .or_else(|| inventory.layouts.first())
        .ok_or_else(|| Error::MissingComponent("ppt/slideLayouts".to_string()))?;

    let mut emit = |title: &str,
                    bullets: &[String],
                    layout: &LayoutInfo,
                    notes: Option<&str>,
                    with_image: bool|
     -> Result<()> {
        let slide_number = next_slide;
        next_slide += 1;

        let mut slide_rels: Vec<(u32, &str, String)> = vec![(
            1,
            REL_SLIDE_LAYOUT,
            format!("../slideLayouts/{}", file_name(&layout.path)),
        )];

        let mut image_rid = None;
        if with_image && !inventory.media.is_empty() {
            let media = &inventory.media[image_cursor % inventory.media.len()];
            image_cursor += 1;
            let rid = slide_rels.len() as u32 + 1;
            slide_rels.push((rid, REL_IMAGE, format!("../media/{}", file_name(media))));
            image_rid = Some(rid);
        }

        if let Some(notes_text) = notes {
            let notes_number = next_notes;
            next_notes += 1;
            let rid = slide_rels.len() as u32 + 1;
            slide_rels.push((
                rid,
                REL_NOTES_SLIDE,
                format!("../notesSlides/notesSlide{}.xml", notes_number),
            ));

            let mut notes_rels: Vec<(u32, &str, String)> = vec![(
                1,
                REL_SLIDE,
                format!("../slides/slide{}.xml", slide_number),
            )];
            if inventory.has_notes_master {
                notes_rels.push((
                    2,
                    REL_NOTES_MASTER,
                    "../notesMasters/notesMaster1.xml".to_string(),
                ));
            }

            new_parts.push((
                format!("ppt/notesSlides/notesSlide{}.xml", notes_number),
                notes_slide_xml(notes_text),
            ));
            new_parts.push((
                format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", notes_number),
                relationships_xml(&notes_rels),
            ));
            override_entries.push_str(&format!(
                r#"<Override PartName="/ppt/notesSlides/notesSlide{}.xml" ContentType="{}"/>"#,
                notes_number, NOTES_CONTENT_TYPE
            ));
        }

        new_parts.push((
            format!("ppt/slides/slide{}.xml", slide_number),
            slide_xml(title, bullets, image_rid),
        ));
        new_parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", slide_number),
            relationships_xml(&slide_rels),
        ));
        override_entries.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            slide_number, SLIDE_CONTENT_TYPE
        ));

        let rid = next_rid;
        next_rid += 1;
        rel_entries.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            rid, REL_SLIDE, slide_number
        ));
        sld_id_entries.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            next_sld_id, rid
        ));
        next_sld_id += 1;
        Ok(())
    };

    emit(&outline.title, &[], title_layout, None, false)?;
    for slide in &outline.slides {
        let layout = resolve_layout(&inventory, &slide.layout)?;
        emit(
            &slide.title,
            &slide.bullets,
            layout,
            slide.notes.as_deref(),
            true,
        )?;
    }
    drop(emit);

    let presentation = register_slide_ids(&presentation, &sld_id_entries)?;
    let presentation_rels = insert_before(&presentation_rels, "</Relationships>", &rel_entries)?;
    let content_types = insert_before(&content_types, "</Types>", &override_entries)?;

    write_package(
        template_bytes,
        &[
            ("ppt/presentation.xml", presentation),
            ("ppt/_rels/presentation.xml.rels", presentation_rels),
            ("[Content_Types].xml", content_types),
        ],
        &new_parts,
    )
}

/// Resolve a slide's layout hint against the template inventory.
fn resolve_layout<'a>(
    inventory: &'a TemplateInventory,
    hint: &str,
) -> Result<&'a LayoutInfo> {
    let found = if hint.is_empty() || hint.eq_ignore_ascii_case("auto") {
        inventory.find_preferred_layout(AUTO_LAYOUTS)
    } else {
        let mut preferred = vec![hint];
        preferred.extend_from_slice(&AUTO_LAYOUTS[..3]);
        inventory.find_preferred_layout(&preferred)
    };
    found
        .or_else(|| inventory.fallback_layout())
        .ok_or_else(|| Error::MissingComponent("ppt/slideLayouts".to_string()))
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Highest `rIdN` in a relationships part.
fn max_relationship_id(rels_xml: &str) -> u32 {
    let mut reader = quick_xml::Reader::from_str(rels_xml);
    let mut buf = Vec::new();
    let mut max = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"Relationship" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"Id" {
                            let id = String::from_utf8_lossy(&attr.value);
                            if let Ok(n) = id.trim_start_matches("rId").parse::<u32>() {
                                max = max.max(n);
                            }
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    max
}

/// Highest `p:sldId/@id` in presentation.xml (0 when no slides exist).
fn max_slide_id(presentation_xml: &str) -> u32 {
    let mut reader = quick_xml::Reader::from_str(presentation_xml);
    let mut buf = Vec::new();
    let mut max = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"sldId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"id" {
                            if let Ok(n) =
                                String::from_utf8_lossy(&attr.value).parse::<u32>()
                            {
                                max = max.max(n);
                            }
                        }
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    max
}

/// Insert `insertion` immediately before `marker`.
fn insert_before(xml: &str, marker: &str, insertion: &str) -> Result<String> {
    let pos = xml
        .find(marker)
        .ok_or_else(|| Error::InvalidData(format!("missing {} in package part", marker)))?;
    let mut out = String::with_capacity(xml.len() + insertion.len());
    out.push_str(&xml[..pos]);
    out.push_str(insertion);
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Register new slides in `p:sldIdLst`, creating the list when the
/// template (e.g. a bare .potx) does not carry one. The list must follow
/// `p:sldMasterIdLst` in schema order.
fn register_slide_ids(presentation_xml: &str, entries: &str) -> Result<String> {
    if presentation_xml.contains("</p:sldIdLst>") {
        return insert_before(presentation_xml, "</p:sldIdLst>", entries);
    }

    let wrapped = format!("<p:sldIdLst>{}</p:sldIdLst>", entries);

    if let Some(pos) = presentation_xml.find("<p:sldIdLst/>") {
        let mut out = presentation_xml.to_string();
        out.replace_range(pos..pos + "<p:sldIdLst/>".len(), &wrapped);
        return Ok(out);
    }

    if let Some(pos) = presentation_xml.find("</p:sldMasterIdLst>") {
        let split = pos + "</p:sldMasterIdLst>".len();
        return Ok(format!(
            "{}{}{}",
            &presentation_xml[..split],
            wrapped,
            &presentation_xml[split..]
        ));
    }

    // Last resort: right after the opening <p:presentation ...> tag.
    let open = presentation_xml
        .find("<p:presentation")
        .and_then(|start| presentation_xml[start..].find('>').map(|end| start + end + 1))
        .ok_or_else(|| {
            Error::InvalidData("presentation.xml has no p:presentation element".to_string())
        })?;
    Ok(format!(
        "{}{}{}",
        &presentation_xml[..open],
        wrapped,
        &presentation_xml[open..]
    ))
}

/// Serialize a relationships part.
fn relationships_xml(rels: &[(u32, &str, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
            id,
            rel_type,
            escape(target.as_str())
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Synthesize a slide part: title placeholder, body placeholder with one
/// paragraph per bullet, and optionally a picture referencing template
/// media. Placeholder geometry is inherited from the layout; the picture
/// gets an explicit frame since it belongs to no placeholder.
fn slide_xml(title: &str, bullets: &[String], image_rid: Option<u32>) -> String {
    let mut shapes = String::new();

    shapes.push_str(&format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Title 1\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph type=\"title\"/></p:nvPr></p:nvSpPr><p:spPr/>\
         <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
        escape(title)
    ));

    if !bullets.is_empty() {
        let paragraphs: String = bullets
            .iter()
            .map(|b| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(b.as_str())))
            .collect();
        shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"3\" name=\"Content Placeholder 2\"/>\
             <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
             <p:nvPr><p:ph type=\"body\" idx=\"1\"/></p:nvPr></p:nvSpPr><p:spPr/>\
             <p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>",
            paragraphs
        ));
    }

    if let Some(rid) = image_rid {
        shapes.push_str(&format!(
            "<p:pic><p:nvPicPr><p:cNvPr id=\"4\" name=\"Picture 3\"/>\
             <p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr>\
             <p:nvPr/></p:nvPicPr>\
             <p:blipFill><a:blip r:embed=\"rId{}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
             <p:spPr><a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
            rid, PIC_OFFSET.0, PIC_OFFSET.1, PIC_EXTENT.0, PIC_EXTENT.1
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
         <a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
         {}\
         </p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
        shapes
    )
}

/// Synthesize a notes-slide part carrying the speaker notes text.
fn notes_slide_xml(notes: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:notes xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
         <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
         <a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Notes Placeholder 1\"/>\
         <p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>\
         <p:nvPr><p:ph type=\"body\" idx=\"1\"/></p:nvPr></p:nvSpPr><p:spPr/>\
         <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>\
         </p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>",
        escape(notes)
    )
}

/// Rewrite the package: copy every original entry through (patched parts
/// substituted in place), then append the new parts.
fn write_package(
    template_bytes: &[u8],
    patched: &[(&str, String)],
    new_parts: &[(String, String)],
) -> Result<Vec<u8>> {
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;

    let mut archive = zip::ZipArchive::new(Cursor::new(template_bytes.to_vec()))?;
    let mut out = Vec::new();
    let mut writer = zip::ZipWriter::new(Cursor::new(&mut out));
    let options = SimpleFileOptions::default();

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();

        if let Some((_, content)) = patched.iter().find(|(p, _)| *p == name) {
            writer.start_file(name, options)?;
            writer.write_all(content.as_bytes())?;
        } else {
            writer.raw_copy_file(file)?;
        }
    }

    for (path, content) in new_parts {
        writer.start_file(path.clone(), options)?;
        writer.write_all(content.as_bytes())?;
    }

    writer.finish()?;
    Ok(out)
}
