use async_trait::async_trait;
use bytes::Bytes;

use crate::extraction::{ExtractError, Extractor, ProgressObserver, RawText};

const UTF8_BOM: char = '\u{feff}';

/// Plain text is decoded as UTF-8. Invalid sequences become U+FFFD rather than
/// failing the upload, and a leading byte-order mark is dropped.
pub struct PlainTextExtractor;

#[async_trait]
impl Extractor for PlainTextExtractor {
    async fn extract(
        &self,
        bytes: Bytes,
        _progress: &dyn ProgressObserver,
    ) -> Result<RawText, ExtractError> {
        let decoded = String::from_utf8_lossy(&bytes);
        let text = decoded.strip_prefix(UTF8_BOM).unwrap_or(&decoded).to_string();
        Ok(RawText { text, pages: None })
    }
}
