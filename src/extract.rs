use std::fs::File;
use std::io::{self, Read};
use std::panic;
use std::path::{Path, PathBuf};

use lopdf::Document;
use thiserror::Error;

/// Errors produced while turning a PDF file into plain text
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to open PDF {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: OpenFailure,
    },

    #[error("Failed to extract text from PDF {path:?}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

/// Why a file could not be opened as a PDF document
#[derive(Debug, Error)]
pub enum OpenFailure {
    #[error("could not read file")]
    Io(#[from] io::Error),

    #[error("not a valid PDF")]
    Parse(#[from] lopdf::Error),
}

/// A parsed PDF document
pub struct PdfDocument {
    path: PathBuf,
    bytes: Vec<u8>,
    doc: Document,
}

impl PdfDocument {
    /// Open and parse the PDF at `path`.
    ///
    /// The file is read in full and its handle closed before this returns,
    /// whether or not parsing succeeds.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let open_err = |source: OpenFailure| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        };

        tracing::debug!(path = %path.display(), "opening PDF");

        let bytes = {
            let mut file = File::open(path).map_err(|e| open_err(e.into()))?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|e| open_err(e.into()))?;
            bytes
        };

        let doc = Document::load_mem(&bytes).map_err(|e| open_err(e.into()))?;

        tracing::debug!(
            bytes = bytes.len(),
            pages = doc.get_pages().len(),
            "PDF loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            doc,
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Plain-text stream covering every page, in page order
    pub fn plain_text(&self) -> Result<TextStream, ExtractError> {
        let bytes = self.bytes.as_slice();

        // pdf_extract can panic on complex PDFs
        let text = match panic::catch_unwind(move || pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "pdf_extract failed, falling back to lopdf");
                self.extract_with_lopdf()?
            }
            Err(_) => {
                tracing::warn!("pdf_extract crashed, falling back to lopdf");
                self.extract_with_lopdf()?
            }
        };

        Ok(TextStream::new(text))
    }

    fn extract_with_lopdf(&self) -> Result<String, ExtractError> {
        let pages = self.doc.get_pages();
        collect_pages(&self.path, pages.keys().copied(), |page_num| {
            self.doc.extract_text(&[page_num])
        })
    }
}

/// Join per-page text, one line break after each page. The first page that
/// fails to decode aborts the whole extraction.
fn collect_pages<I, F>(path: &Path, pages: I, mut page_text: F) -> Result<String, ExtractError>
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32) -> lopdf::Result<String>,
{
    let mut text = String::new();

    for page_num in pages {
        let page = page_text(page_num).map_err(|source| ExtractError::Extraction {
            path: path.to_path_buf(),
            source,
        })?;
        text.push_str(&page);
        text.push('\n');
    }

    Ok(text)
}

/// Decoded text of a whole document
pub struct TextStream {
    text: String,
}

impl TextStream {
    fn new(text: String) -> Self {
        Self { text }
    }

    /// Drain the stream into an owned buffer
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Extract the plain text of the PDF at `path`
pub fn read_pdf(path: &Path) -> Result<String, ExtractError> {
    let doc = PdfDocument::open(path)?;
    let buf = doc.plain_text()?.into_string();

    tracing::debug!(chars = buf.len(), pages = doc.page_count(), "text extracted");

    Ok(buf)
}
