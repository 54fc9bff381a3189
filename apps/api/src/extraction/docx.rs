//! DOCX strategy: raw text from `word/document.xml` inside the ZIP container.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::extraction::{DocumentFormat, ExtractError, Extractor, ProgressObserver, RawText};

const DOCUMENT_PART: &str = "word/document.xml";

fn docx_error(cause: impl std::fmt::Display) -> ExtractError {
    ExtractError::failed(DocumentFormat::Docx, cause)
}

pub struct DocxExtractor;

#[async_trait]
impl Extractor for DocxExtractor {
    async fn extract(
        &self,
        bytes: Bytes,
        progress: &dyn ProgressObserver,
    ) -> Result<RawText, ExtractError> {
        progress.on_progress("Processing DOCX file...");

        let text = tokio::task::spawn_blocking(move || {
            let xml = read_document_part(&bytes, MAX_DOCUMENT_XML_BYTES)?;
            document_xml_to_text(&xml)
        })
        .await
        .map_err(docx_error)??;

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyDocument("DOCX file is empty.".to_string()));
        }
        Ok(RawText { text, pages: None })
    }
}

/// Decompressed size cap for `word/document.xml`. The upload limit applies to
/// the compressed container, which can inflate far past it.
pub const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

/// WordprocessingML main namespace, transitional and strict.
const WORDML_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

fn read_document_part(bytes: &[u8], max_xml_bytes: u64) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let part = archive.by_name(DOCUMENT_PART).map_err(docx_error)?;
    if part.size() > max_xml_bytes {
        return Err(oversized_part(max_xml_bytes));
    }

    // The declared size can lie; never inflate more than one byte past the cap.
    let mut xml = String::new();
    part.take(max_xml_bytes + 1)
        .read_to_string(&mut xml)
        .map_err(docx_error)?;
    if xml.len() as u64 > max_xml_bytes {
        return Err(oversized_part(max_xml_bytes));
    }
    Ok(xml)
}

fn oversized_part(max_xml_bytes: u64) -> ExtractError {
    docx_error(format!(
        "{DOCUMENT_PART} inflates past {} MB",
        max_xml_bytes / (1024 * 1024)
    ))
}

/// Collects the text of every `t` run in the WordprocessingML namespace,
/// whatever prefix the document binds it to. Tabs and breaks map to `\t` and
/// `\n`; each paragraph ends with a blank line.
fn document_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = NsReader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        let (namespace, event) = reader.read_resolved_event().map_err(docx_error)?;
        let wordml = matches!(
            namespace,
            ResolveResult::Bound(Namespace(uri)) if WORDML_NAMESPACES.contains(&uri)
        );
        match event {
            Event::Start(e) if wordml && e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) if wordml => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) if wordml => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                text.push_str(&e.unescape().map_err(docx_error)?);
            }
            Event::CData(e) if in_text_run => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
