use actix_web::web;
use thiserror::Error;
use tracing::warn;

/// Upload formats deadlines can be extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Csv,
}

#[derive(Error, Debug, PartialEq)]
pub enum DocumentError {
    #[error("Unsupported content type: `{0}`. Supported types are application/pdf, text/plain and text/csv")]
    UnsupportedContentType(String),
    #[error("Unable to read the pdf document")]
    UnreadablePdf,
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Result<Self, DocumentError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "text/plain" => Ok(Self::PlainText),
            "text/csv" => Ok(Self::Csv),
            _ => Err(DocumentError::UnsupportedContentType(content_type.to_string())),
        }
    }
}

/// Text content of an uploaded document. Pdf parsing runs on the blocking thread pool.
pub async fn read_document(kind: DocumentKind, bytes: web::Bytes) -> Result<String, DocumentError> {
    match kind {
        DocumentKind::Pdf => {
            let text = web::block(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| {
                    warn!("Pdf extraction was cancelled: {:?}", e);
                    DocumentError::UnreadablePdf
                })?
                .map_err(|e| {
                    warn!("Pdf extraction failed: {:?}", e);
                    DocumentError::UnreadablePdf
                })?;
            Ok(text.trim().to_string())
        }
        DocumentKind::PlainText | DocumentKind::Csv => Ok(decode_text(&bytes)),
    }
}

/// Utf-8 with a Latin-1 fallback, which maps every byte to a char
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
