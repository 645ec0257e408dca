//! Template package access and inventory.

use std::cell::RefCell;
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

/// A slide layout available in the template.
#[derive(Debug, Clone)]
pub struct LayoutInfo {
    /// Package path, e.g. `ppt/slideLayouts/slideLayout2.xml`.
    pub path: String,
    /// Display name from `p:cSld/@name`, e.g. "Title and Content".
    pub name: String,
}

/// Read-only view over the uploaded OOXML package.
pub struct TemplatePackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

/// Decode XML bytes, handling UTF-8 and UTF-16 byte-order marks.
///
/// Office packages are normally UTF-8, but tooling occasionally emits
/// UTF-16 parts; undecodable input falls back to lossy UTF-8.
fn decode_xml_bytes(bytes: &[u8]) -> String {
    if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        return String::from_utf8_lossy(&bytes[3..]).into_owned();
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFF, 0xFE] {
        return decode_utf16(&bytes[2..], u16::from_le_bytes);
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFE, 0xFF] {
        return decode_utf16(&bytes[2..], u16::from_be_bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let len = bytes.len() & !1;
    let units = (0..len)
        .step_by(2)
        .map(|i| from_bytes([bytes[i], bytes[i + 1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

impl TemplatePackage {
    /// Open a package from raw bytes; rejects anything that is not a ZIP.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(decode_xml_bytes(&bytes))
    }

    /// Check whether a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List part names matching a prefix.
    pub fn list_with_prefix(&self, prefix: &str) -> Vec<String> {
        let archive = self.archive.borrow();
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with(prefix))
            .map(String::from)
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for TemplatePackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePackage")
            .field("parts", &self.archive.borrow().len())
            .finish()
    }
}

/// What the template has to offer: layouts by name, embedded media, and
/// the numbering state needed to append new parts.
#[derive(Debug, Clone, Default)]
pub struct TemplateInventory {
    /// Layouts in package order.
    pub layouts: Vec<LayoutInfo>,
    /// Media part paths (`ppt/media/...`), sorted.
    pub media: Vec<String>,
    /// Highest existing slide part number (0 when the template has none).
    pub max_slide_number: u32,
    /// Highest existing notes-slide part number.
    pub max_notes_number: u32,
    /// Whether the package carries a notes master.
    pub has_notes_master: bool,
}

/// Extract the trailing part number from e.g. `ppt/slides/slide12.xml`.
fn part_number(path: &str, prefix: &str) -> Option<u32> {
    path.strip_prefix(prefix)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Pull the `name` attribute off the `p:cSld` element of a layout part.
fn layout_display_name(xml: &str) -> Option<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"cSld" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            return Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                    return None;
                }
            }
            Ok(quick_xml::events::Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

impl TemplateInventory {
    /// Scan a package for layouts, media, and part numbering.
    pub fn scan(package: &TemplatePackage) -> Result<Self> {
        let mut layout_paths: Vec<String> = package
            .list_with_prefix("ppt/slideLayouts/slideLayout")
            .into_iter()
            .filter(|p| !p.contains("/_rels/") && p.ends_with(".xml"))
            .collect();
        layout_paths.sort_by_key(|p| part_number(p, "ppt/slideLayouts/slideLayout").unwrap_or(0));

        let mut layouts = Vec::with_capacity(layout_paths.len());
        for path in layout_paths {
            let name = package
                .read_xml(&path)
                .ok()
                .and_then(|xml| layout_display_name(&xml))
                .unwrap_or_default();
            layouts.push(LayoutInfo { path, name });
        }

        let media = package
            .list_with_prefix("ppt/media/")
            .into_iter()
            .filter(|p| !p.ends_with('/'))
            .collect();

        let max_slide_number = package
            .list_with_prefix("ppt/slides/slide")
            .iter()
            .filter_map(|p| part_number(p, "ppt/slides/slide"))
            .max()
            .unwrap_or(0);

        let max_notes_number = package
            .list_with_prefix("ppt/notesSlides/notesSlide")
            .iter()
            .filter_map(|p| part_number(p, "ppt/notesSlides/notesSlide"))
            .max()
            .unwrap_or(0);

        Ok(Self {
            layouts,
            media,
            max_slide_number,
            max_notes_number,
            has_notes_master: package.exists("ppt/notesMasters/notesMaster1.xml"),
        })
    }

    /// Resolve a preference list to a layout: exact case-insensitive name
    /// match first, then substring containment, in preference order.
    pub fn find_preferred_layout(&self, preferred: &[&str]) -> Option<&LayoutInfo> {
        for want in preferred {
            let want = want.to_lowercase();
            if let Some(layout) = self
                .layouts
                .iter()
                .find(|l| l.name.to_lowercase() == want)
            {
                return Some(layout);
            }
        }
        for want in preferred {
            let want = want.to_lowercase();
            if let Some(layout) = self
                .layouts
                .iter()
                .find(|l| !want.is_empty() && l.name.to_lowercase().contains(&want))
            {
                return Some(layout);
            }
        }
        None
    }

    /// The fallback layout when no preference matches: the second layout in
    /// package order when present, else the first.
    pub fn fallback_layout(&self) -> Option<&LayoutInfo> {
        self.layouts.get(1).or_else(|| self.layouts.first())
    }
}
