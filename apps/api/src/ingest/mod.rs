// Upload text extraction: TXT, PDF, DOCX, and ZIP bundles of those.
//
// ZIP bundles concatenate their entries into one document, each section
// prefixed with a `=== name ===` banner, and recurse into nested archives.
// Entry reads are bounded so a crafted archive cannot balloon in memory.

use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;

/// Decompressed bytes allowed per archive entry.
const MAX_ENTRY_BYTES: u64 = 20 * 1024 * 1024;
/// Archives nested deeper than this are rejected.
const MAX_ZIP_DEPTH: u8 = 3;

/// Extracts plain text from an upload, dispatching on the file extension.
pub fn extract_upload(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    extract_inner(filename, bytes, 0)
}

fn extract_inner(filename: &str, bytes: &[u8], depth: u8) -> Result<String, AppError> {
    let ext = std::path::Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => extract_txt(bytes),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        "zip" => extract_zip(bytes, depth),
        _ => Err(AppError::Validation(format!("Unsupported file type: .{ext}"))),
    }
}

fn extract_txt(bytes: &[u8]) -> Result<String, AppError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Validation(format!("PDF extraction failed: {e}")))
}

/// DOCX is a ZIP with the document body at word/document.xml. Text lives in
/// `w:t` elements; a paragraph close becomes a newline.
fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| AppError::Validation(format!("DOCX could not be opened: {e}")))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| AppError::Validation("DOCX has no document body".to_string()))?;
    let xml = read_bounded(entry)?;
    docx_body_text(&xml)
}

fn docx_body_text(xml: &[u8]) -> Result<String, AppError> {
    // Text is taken verbatim; runs split mid-sentence keep their spacing.
    let mut reader = Reader::from_reader(xml);
    let mut out = String::new();
    let mut buf = Vec::new();
    let mut in_run_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Ok(Event::Text(text)) if in_run_text => {
                out.push_str(&text.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Validation(format!("DOCX body could not be parsed: {e}")))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn extract_zip(bytes: &[u8], depth: u8) -> Result<String, AppError> {
    if depth >= MAX_ZIP_DEPTH {
        return Err(AppError::Validation("ZIP archives nested too deeply".to_string()));
    }
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| AppError::Validation(format!("ZIP archive could not be opened: {e}")))?;

    let mut sections = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| AppError::Validation(format!("ZIP entry could not be read: {e}")))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let data = read_bounded(entry)?;
        let content = extract_inner(&name, &data, depth + 1)?;
        sections.push(format!("=== {name} ===\n{content}\n"));
    }
    Ok(sections.join("\n"))
}

/// Reads an archive entry up to the size bound and rejects anything larger,
/// instead of trusting the declared sizes in the central directory.
fn read_bounded<R: Read>(entry: R) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    entry
        .take(MAX_ENTRY_BYTES + 1)
        .read_to_end(&mut data)
        .map_err(|e| AppError::Validation(format!("Archive entry could not be read: {e}")))?;
    if data.len() as u64 > MAX_ENTRY_BYTES {
        return Err(AppError::Validation("Archive entry exceeds the size limit".to_string()));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_txt_passthrough() {
        let out = extract_upload("resume.txt", b"plain text body").unwrap();
        assert_eq!(out, "plain text body");
    }

    #[test]
    fn test_txt_rejects_invalid_utf8() {
        let result = extract_upload("resume.txt", &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = extract_upload("resume.exe", b"MZ");
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Unsupported file type: .exe");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let out = extract_upload("RESUME.TXT", b"upper case name").unwrap();
        assert_eq!(out, "upper case name");
    }

    #[test]
    fn test_pdf_rejects_garbage() {
        let result = extract_upload("resume.pdf", b"not a pdf at all");
        assert!(result.is_err());
    }

    #[test]
    fn test_zip_concatenates_entries_with_banners() {
        let bundle = build_zip(&[("a.txt", b"alpha body"), ("b.txt", b"beta body")]);
        let out = extract_upload("bundle.zip", &bundle).unwrap();
        assert_eq!(
            out,
            "=== a.txt ===\nalpha body\n\n=== b.txt ===\nbeta body\n"
        );
    }

    #[test]
    fn test_zip_unsupported_entry_propagates() {
        let bundle = build_zip(&[("tool.exe", b"MZ")]);
        let result = extract_upload("bundle.zip", &bundle);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_nested_zip_is_flattened() {
        let inner = build_zip(&[("inner.txt", b"nested body")]);
        let outer = build_zip(&[("inner.zip", &inner)]);
        let out = extract_upload("outer.zip", &outer).unwrap();
        assert!(out.starts_with("=== inner.zip ===\n"));
        assert!(out.contains("=== inner.txt ===\nnested body\n"));
    }

    #[test]
    fn test_zip_nesting_depth_is_bounded() {
        let mut archive = build_zip(&[("level0.txt", b"deepest")]);
        for level in 0..4 {
            archive = build_zip(&[(format!("level{level}.zip").as_str(), archive.as_slice())]);
        }
        let result = extract_upload("outermost.zip", &archive);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_docx_body_text() {
        let body = br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second</w:t></w:r><w:r><w:t> paragraph</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let docx = build_zip(&[("word/document.xml", body)]);
        let out = extract_upload("resume.docx", &docx).unwrap();
        assert_eq!(out, "First paragraph\nSecond paragraph\n");
    }

    #[test]
    fn test_docx_without_body_rejected() {
        let not_docx = build_zip(&[("other.txt", b"no body here")]);
        let result = extract_upload("resume.docx", &not_docx);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
