use super::{split_pages, ExtractionError, PageContent};

/// `#`-style heading text, or `None` for any other line.
fn heading(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.trim_start_matches('#');
    let level = trimmed.len() - rest.len();
    if (1..=6).contains(&level) && (rest.is_empty() || rest.starts_with(' ')) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Markdown with heading markers removed, so `#` never reaches the chunk
/// text. Heading titles stay inline.
pub fn extract_md(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let mut pages = split_pages(&String::from_utf8_lossy(bytes));
    for page in &mut pages {
        let text: Vec<&str> = page
            .text
            .lines()
            .map(|line| heading(line).unwrap_or(line))
            .collect();
        page.text = text.join("\n").trim().to_string();
    }
    Ok(pages)
}
