//! PDF strategy.
//!
//! Only the first `MAX_PDF_PAGES` pages are read; the rest are ignored to bound
//! latency. Pages are extracted as independent tasks and reassembled by page
//! index, so completion order never affects the output.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::Content;
use lopdf::{Encoding, Object};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::extraction::{
    DocumentFormat, ExtractError, Extractor, PageCoverage, ProgressObserver, RawText,
};

pub const MAX_PDF_PAGES: usize = 10;

/// A loaded document whose pages can be read independently.
/// Pages are addressed by zero-based index in reading order.
#[async_trait]
pub trait PaginatedDocument: Send + Sync + 'static {
    fn page_count(&self) -> usize;

    /// Text runs of one page, in content-stream order.
    async fn page_runs(&self, index: usize) -> Result<Vec<String>, ExtractError>;
}

fn pdf_error(cause: impl std::fmt::Display) -> ExtractError {
    ExtractError::failed(DocumentFormat::Pdf, cause)
}

/// lopdf-backed document. Parsing and per-page decoding run on the blocking pool.
pub struct LopdfDocument {
    doc: Arc<lopdf::Document>,
    page_numbers: Vec<u32>,
}

impl LopdfDocument {
    pub async fn load(bytes: Bytes) -> Result<Self, ExtractError> {
        let doc = tokio::task::spawn_blocking(move || lopdf::Document::load_mem(&bytes))
            .await
            .map_err(pdf_error)?
            .map_err(pdf_error)?;
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self {
            doc: Arc::new(doc),
            page_numbers,
        })
    }
}

#[async_trait]
impl PaginatedDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    async fn page_runs(&self, index: usize) -> Result<Vec<String>, ExtractError> {
        let page_number = *self
            .page_numbers
            .get(index)
            .ok_or_else(|| pdf_error(format!("page index {index} out of range")))?;
        let doc = Arc::clone(&self.doc);
        tokio::task::spawn_blocking(move || page_text_runs(&doc, page_number))
            .await
            .map_err(pdf_error)?
            .map_err(pdf_error)
    }
}

/// Kerning offsets below this (thousandths of an em) read as a word gap.
const TJ_WORD_GAP: f32 = -100.0;

/// One run per text-showing operator (`Tj`, `TJ`, `'`, `"`), in content-stream
/// order. Strings are decoded with the encoding of the font selected by `Tf`.
fn page_text_runs(doc: &lopdf::Document, page_number: u32) -> lopdf::Result<Vec<String>> {
    let page_id = *doc
        .get_pages()
        .get(&page_number)
        .ok_or(lopdf::Error::PageNumberNotFound(page_number))?;

    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(encoding) => Some((name, encoding)),
            Err(err) => {
                debug!("Skipping font without usable encoding: {err}");
                None
            }
        })
        .collect();

    let content = Content::decode(&doc.get_page_content(page_id)?)?;
    let mut current: Option<&Encoding> = None;
    let mut runs = Vec::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let Some(encoding) = current else {
                    debug!("Text shown before a known font was selected on page {page_number}");
                    continue;
                };
                let mut run = String::new();
                collect_strings(&mut run, encoding, &operation.operands)?;
                let run = run.trim();
                if !run.is_empty() {
                    runs.push(run.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(runs)
}

fn collect_strings(
    run: &mut String,
    encoding: &Encoding,
    operands: &[Object],
) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                run.push_str(&lopdf::Document::decode_text(encoding, bytes)?)
            }
            Object::Array(items) => collect_tj_items(run, encoding, items)?,
            _ => {}
        }
    }
    Ok(())
}

/// A `TJ` array mixes strings with kerning offsets.
fn collect_tj_items(
    run: &mut String,
    encoding: &Encoding,
    items: &[Object],
) -> lopdf::Result<()> {
    for item in items {
        match item {
            Object::String(bytes, _) => {
                run.push_str(&lopdf::Document::decode_text(encoding, bytes)?)
            }
            Object::Integer(_) | Object::Real(_) => {
                let wide_gap = item.as_float().is_ok_and(|offset| offset < TJ_WORD_GAP);
                if wide_gap && !run.ends_with(' ') {
                    run.push(' ');
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Reads up to `MAX_PDF_PAGES` pages concurrently. Runs on a page are joined by
/// a single space, pages by a newline, in page order.
pub async fn collect_pages(
    doc: Arc<dyn PaginatedDocument>,
    progress: &dyn ProgressObserver,
) -> Result<RawText, ExtractError> {
    let total_pages = doc.page_count();
    let pages_read = total_pages.min(MAX_PDF_PAGES);
    progress.on_progress(&format!("Reading {pages_read} pages in parallel..."));

    let mut tasks = JoinSet::new();
    for index in 0..pages_read {
        let doc = Arc::clone(&doc);
        tasks.spawn(async move { (index, doc.page_runs(index).await) });
    }

    let mut pages: Vec<String> = vec![String::new(); pages_read];
    while let Some(joined) = tasks.join_next().await {
        let (index, runs) = joined.map_err(pdf_error)?;
        pages[index] = runs?.join(" ");
    }

    if total_pages > pages_read {
        warn!("PDF has {total_pages} pages; only the first {pages_read} were read");
    }

    Ok(RawText {
        text: pages.join("\n"),
        pages: Some(PageCoverage {
            pages_read,
            total_pages,
        }),
    })
}

pub struct PdfExtractor;

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(
        &self,
        bytes: Bytes,
        progress: &dyn ProgressObserver,
    ) -> Result<RawText, ExtractError> {
        progress.on_progress("Initializing PDF engine...");
        let doc = LopdfDocument::load(bytes).await?;

        let raw = collect_pages(Arc::new(doc), progress).await?;
        if raw.text.trim().is_empty() {
            return Err(ExtractError::EmptyDocument(
                "PDF seems to be empty or image-only.".to_string(),
            ));
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    use super::*;
    use crate::extraction::test_support::RecordingProgress;
    use crate::extraction::NoProgress;

    /// In-memory document whose pages finish after configurable delays.
    struct FakeDocument {
        pages: Vec<(Vec<&'static str>, u64)>,
        requested: Mutex<Vec<usize>>,
        completed: Mutex<Vec<usize>>,
        failing_page: Option<usize>,
    }

    impl FakeDocument {
        fn new(pages: Vec<(Vec<&'static str>, u64)>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
                completed: Mutex::new(Vec::new()),
                failing_page: None,
            }
        }
    }

    #[async_trait]
    impl PaginatedDocument for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        async fn page_runs(&self, index: usize) -> Result<Vec<String>, ExtractError> {
            self.requested.lock().unwrap().push(index);
            let (runs, delay_ms) = &self.pages[index];
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            self.completed.lock().unwrap().push(index);
            if self.failing_page == Some(index) {
                return Err(pdf_error("bad xref"));
            }
            Ok(runs.iter().map(|r| r.to_string()).collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_keep_order_when_completing_out_of_order() {
        // Later pages finish first.
        let doc = Arc::new(FakeDocument::new(vec![
            (vec!["Jane Doe", "Engineer"], 300),
            (vec!["Experience"], 200),
            (vec!["Education", "BSc"], 100),
        ]));

        let raw = collect_pages(doc.clone(), &NoProgress).await.unwrap();

        assert_eq!(raw.text, "Jane Doe Engineer\nExperience\nEducation BSc");
        assert_eq!(*doc.completed.lock().unwrap(), vec![2, 1, 0]);
        assert_eq!(
            raw.pages,
            Some(PageCoverage {
                pages_read: 3,
                total_pages: 3
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_first_ten_pages_contribute() {
        let labels: Vec<&'static str> = vec![
            "p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8", "p9", "p10", "p11", "p12",
        ];
        let pages = labels.iter().map(|l| (vec![*l], 10)).collect();
        let doc = Arc::new(FakeDocument::new(pages));

        let raw = collect_pages(doc.clone(), &NoProgress).await.unwrap();

        assert_eq!(raw.text, "p1\np2\np3\np4\np5\np6\np7\np8\np9\np10");
        let mut requested = doc.requested.lock().unwrap().clone();
        requested.sort_unstable();
        assert_eq!(requested, (0..10).collect::<Vec<_>>());
        let coverage = raw.pages.unwrap();
        assert_eq!(coverage.pages_read, 10);
        assert_eq!(coverage.total_pages, 12);
        assert!(coverage.truncated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_failure_fails_the_whole_document() {
        let mut doc = FakeDocument::new(vec![(vec!["ok"], 10), (vec!["broken"], 20)]);
        doc.failing_page = Some(1);

        let err = collect_pages(Arc::new(doc), &NoProgress).await.unwrap_err();
        assert!(err.to_string().contains("bad xref"));
        assert!(matches!(
            err,
            ExtractError::Failed {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reports_page_count() {
        let doc = Arc::new(FakeDocument::new(vec![(vec!["a"], 1), (vec!["b"], 1)]));
        let progress = RecordingProgress::default();

        collect_pages(doc, &progress).await.unwrap();

        assert_eq!(
            *progress.messages.lock().unwrap(),
            vec!["Reading 2 pages in parallel...".to_string()]
        );
    }

    fn show_text_page(text: &str) -> Vec<Operation> {
        if text.is_empty() {
            return Vec::new();
        }
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]
    }

    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        build_pdf_from_operations(page_texts.iter().map(|t| show_text_page(t)).collect())
    }

    fn build_pdf_from_operations(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_extracts_text_from_generated_pdf() {
        let bytes = build_pdf(&["Jane Doe", "Senior Engineer"]);
        let raw = PdfExtractor
            .extract(Bytes::from(bytes), &NoProgress)
            .await
            .unwrap();

        let lines: Vec<&str> = raw.text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Jane Doe"));
        assert!(lines[1].contains("Senior Engineer"));
    }

    #[tokio::test]
    async fn test_runs_inside_one_text_object_are_space_separated() {
        let bytes = build_pdf_from_operations(vec![vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal("Rust engineer")]),
            Operation::new("Td", vec![0.into(), (-14).into()]),
            Operation::new("Tj", vec![Object::string_literal("Led a team")]),
            Operation::new("'", vec![Object::string_literal("Shipped SaaS")]),
            Operation::new(
                "\"",
                vec![1.into(), 0.into(), Object::string_literal("Mentored juniors")],
            ),
            Operation::new("ET", vec![]),
        ]]);

        let raw = PdfExtractor
            .extract(Bytes::from(bytes), &NoProgress)
            .await
            .unwrap();

        assert_eq!(raw.text, "Rust engineer Led a team Shipped SaaS Mentored juniors");
    }

    #[tokio::test]
    async fn test_tj_array_is_one_run_with_wide_kerning_as_gap() {
        let bytes = build_pdf_from_operations(vec![vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Ku"),
                    (-20).into(),
                    Object::string_literal("bernetes"),
                    (-250).into(),
                    Object::string_literal("Terraform"),
                ])],
            ),
            Operation::new("Tj", vec![Object::string_literal("AWS")]),
            Operation::new("ET", vec![]),
        ]]);

        let raw = PdfExtractor
            .extract(Bytes::from(bytes), &NoProgress)
            .await
            .unwrap();

        assert_eq!(raw.text, "Kubernetes Terraform AWS");
    }

    #[tokio::test]
    async fn test_text_objects_across_pages_keep_page_breaks() {
        let bytes = build_pdf(&["Jane Doe", "", "Skills"]);
        let raw = PdfExtractor
            .extract(Bytes::from(bytes), &NoProgress)
            .await
            .unwrap();
        assert_eq!(raw.text, "Jane Doe\n\nSkills");
    }

    #[tokio::test]
    async fn test_pdf_without_text_is_empty_document() {
        let bytes = build_pdf(&["", ""]);
        let err = PdfExtractor
            .extract(Bytes::from(bytes), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument(_)));
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_wrapped_as_pdf_error() {
        let err = PdfExtractor
            .extract(Bytes::from_static(b"not a pdf at all"), &NoProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("PDF error:"), "got: {err}");
    }
}
