use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::config::PdfConfig;
use crate::data::stats::Summary;

use super::ExportError;

/// A4 in PDF points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
/// Advance width of a Courier glyph relative to the font size.
const COURIER_ADVANCE: f32 = 0.6;

/// Render a summary as a monospaced text document; pages are appended as
/// the text grows.
pub fn summary_pdf(summary: &Summary, config: &PdfConfig) -> Result<Vec<u8>, ExportError> {
    let text = format!("Data Summary\n\n{}", summary.to_text());
    text_pdf(&text, config)
}

/// Lay out plain text in Courier, wrapping long lines at the page width.
pub fn text_pdf(text: &str, config: &PdfConfig) -> Result<Vec<u8>, ExportError> {
    let usable_width = PAGE_WIDTH - 2.0 * config.margin;
    let usable_height = PAGE_HEIGHT - 2.0 * config.margin;
    let chars_per_line = ((usable_width / (COURIER_ADVANCE * config.font_size)) as usize).max(1);
    let lines_per_page = ((usable_height / config.line_height) as usize).max(1);

    let lines = wrap_lines(text, chars_per_line);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in lines.chunks(lines_per_page) {
        let content = page_content(page_lines, config);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), (PAGE_WIDTH as i64).into(), (PAGE_HEIGHT as i64).into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    log::debug!("rendered {} line(s) over {page_count} page(s)", lines.len());
    Ok(buf)
}

fn page_content(lines: &[String], config: &PdfConfig) -> Content {
    let font_size = config.font_size.round() as i64;
    let leading = config.line_height.round() as i64;
    let top = (PAGE_HEIGHT - config.margin - config.font_size).round() as i64;

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), font_size.into()]),
        Operation::new("TL", vec![leading.into()]),
        Operation::new("Td", vec![(config.margin.round() as i64).into(), top.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Split on newlines, then hard-wrap at `width` characters. Characters the
/// standard Courier encoding lacks are replaced with `?`.
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line
            .chars()
            .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
            .collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        out.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnType, Table};
    use crate::data::stats::describe;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    #[test]
    fn summary_document_carries_the_statistics() {
        let table = Table::new(vec![Column::new(
            "a",
            ColumnType::Integer,
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)],
        )])
        .unwrap();

        let bytes = summary_pdf(&describe(&table), &PdfConfig::default()).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(contains(&bytes, "(Data Summary) Tj"));
        assert!(contains(&bytes, "(count  3.00) Tj"));
        assert!(contains(&bytes, "(mean   2.00) Tj"));
        assert!(contains(&bytes, "(min    1.00) Tj"));
        assert!(contains(&bytes, "(max    3.00) Tj"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_text_grows_extra_pages() {
        let text = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let bytes = text_pdf(&text, &PdfConfig::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn wraps_and_sanitizes_lines() {
        assert_eq!(wrap_lines("abcdef\n\nxy", 4), vec!["abcd", "ef", "", "xy"]);
        assert_eq!(wrap_lines("é", 4), vec!["?"]);
    }
}
