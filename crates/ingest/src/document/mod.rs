pub mod chunker;
mod md;
mod pdf;
mod txt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no extractor for .{0} files")]
    Unsupported(String),
    #[error("unreadable PDF: {0}")]
    Pdf(String),
    #[error("no extractable text")]
    NoText,
}

/// Source formats the ingestor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
}

impl DocumentKind {
    /// Kind for a lowercase extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn of(filename: &str) -> Option<Self> {
        Self::from_extension(&file_extension(filename))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
            Self::Markdown => "md",
        }
    }
}

/// Text of one source page.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based. Text files without page breaks are one page.
    pub page_number: u32,
    pub text: String,
}

/// Extractor output for one file.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original file name, used as the citation source id.
    pub name: String,
    pub kind: DocumentKind,
    /// Pages that carry text, in page order. Blank pages are omitted but
    /// the remaining pages keep their original numbers.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// Form feed, as written between pages by `pdftotext` exports.
const PAGE_BREAK: char = '\x0C';

/// Number page texts from 1 in order and drop the blank ones. A blank page
/// still advances the count.
pub(crate) fn number_pages<I, S>(texts: I) -> Vec<PageContent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .enumerate()
        .filter_map(|(i, body)| {
            let text = body.as_ref().trim();
            (!text.is_empty()).then(|| PageContent {
                page_number: i as u32 + 1,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Split text on page breaks. Text without a break is page 1, even if blank.
pub(crate) fn split_pages(text: &str) -> Vec<PageContent> {
    if !text.contains(PAGE_BREAK) {
        return vec![PageContent {
            page_number: 1,
            text: text.trim().to_string(),
        }];
    }
    number_pages(text.split(PAGE_BREAK))
}

/// Lowercased extension of `filename`, or "" if it has none.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Extract the pages of `bytes`, picking the extractor from the file name.
pub fn extract(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let kind = DocumentKind::of(filename)
        .ok_or_else(|| ExtractionError::Unsupported(file_extension(filename)))?;

    let pages = match kind {
        DocumentKind::Pdf => pdf::extract_pdf(bytes)?,
        DocumentKind::Text => txt::extract_txt(bytes)?,
        DocumentKind::Markdown => md::extract_md(bytes)?,
    };

    let doc = ExtractedDocument {
        name: filename.to_string(),
        kind,
        pages,
    };
    if doc.is_blank() {
        return Err(ExtractionError::NoText);
    }
    Ok(doc)
}
