//! Font color inspection for written xlsx files.
//!
//! Reopens a workbook as a ZIP archive, resolves each cell's `s` style index
//! through `cellXfs` to its font, and reports explicit RGB font colors.

use crate::a1_notation::parse_a1;
use crate::error::{Result, SheetError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Maps `(row, col)` (0-based) to the explicit font color (0xRRGGBB) of that cell
pub type FontColorMap = BTreeMap<(usize, usize), u32>;

/// Read the font colors of every explicitly styled cell in the first worksheet
///
/// Cells using the default style, or a font without an `rgb` color, are not
/// reported.
///
/// # Errors
///
/// Returns error if the file is not a readable xlsx archive.
pub fn inspect_font_colors<P: AsRef<Path>>(path: P) -> Result<FontColorMap> {
    let file = File::open(path.as_ref())?;
    let mut archive = ZipArchive::new(file)?;

    let styles_xml = read_zip_file(&mut archive, "xl/styles.xml")?;
    let font_colors = parse_font_colors(&styles_xml)?;
    let xf_fonts = parse_cell_xf_fonts(&styles_xml)?;

    let sheet_path = first_worksheet_path(&archive)
        .ok_or_else(|| SheetError::Styles("workbook has no worksheet part".to_string()))?;
    let sheet_xml = read_zip_file(&mut archive, &sheet_path)?;

    let mut colors = FontColorMap::new();
    for (cell_ref, style_id) in parse_cell_styles(&sheet_xml)? {
        let color = xf_fonts
            .get(style_id)
            .and_then(|font_id| font_colors.get(*font_id))
            .copied()
            .flatten();
        if let Some(color) = color {
            colors.insert(parse_a1(&cell_ref)?, color);
        }
    }
    Ok(colors)
}

/// Parse `<fonts>` into the explicit rgb color of each font (by font index)
fn parse_font_colors(xml: &str) -> Result<Vec<Option<u32>>> {
    let mut fonts = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    // 0 = outside, 1 = inside <fonts>, 2 = inside <font>
    let mut depth = 0;
    let mut current: Option<u32> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"fonts" if depth == 0 => depth = 1,
                b"font" if depth == 1 => {
                    depth = 2;
                    current = None;
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"color" if depth == 2 => current = rgb_attr(&e),
                b"font" if depth == 1 => fonts.push(None),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"font" if depth == 2 => {
                    fonts.push(current.take());
                    depth = 1;
                }
                b"fonts" if depth == 1 => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fonts)
}

/// Parse `<cellXfs>` into the font index of each cell format (by xf index)
fn parse_cell_xf_fonts(xml: &str) -> Result<Vec<usize>> {
    let mut xfs = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let font_id = attr_value(&e, b"fontId")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    xfs.push(font_id);
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"cellXfs" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(xfs)
}

/// Parse worksheet XML into `(cell_ref, style_id)` pairs for non-default styles
fn parse_cell_styles(xml: &str) -> Result<Vec<(String, usize)>> {
    let mut cells = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"c" => {
                let style_id = attr_value(&e, b"s").and_then(|v| v.parse::<usize>().ok());
                // style 0 is the workbook default
                if let (Some(cell_ref), Some(style_id)) = (attr_value(&e, b"r"), style_id) {
                    if style_id > 0 {
                        cells.push((cell_ref, style_id));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(cells)
}

fn first_worksheet_path<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<String> {
    if archive.index_for_name("xl/worksheets/sheet1.xml").is_some() {
        return Some("xl/worksheets/sheet1.xml".to_string());
    }
    let mut paths: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    paths.sort();
    paths.into_iter().next()
}

fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive.by_name(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Parse an ARGB (`FFFF0000`) or RGB (`FF0000`) hex attribute, dropping alpha
fn rgb_attr(e: &BytesStart<'_>) -> Option<u32> {
    let hex = attr_value(e, b"rgb")?;
    let rgb = match hex.len() {
        8 => hex.get(2..)?,
        6 => hex.as_str(),
        _ => return None,
    };
    u32::from_str_radix(rgb, 16).ok()
}

fn xml_error(err: quick_xml::Error) -> SheetError {
    SheetError::Styles(err.to_string())
}
