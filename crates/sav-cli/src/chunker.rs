//! Paragraph-based document chunking for ingestion.
//!
//! Splits on blank lines and packs consecutive paragraphs into chunks of at
//! most `MAX_CHUNK_CHARS`. A single oversized paragraph becomes its own
//! chunk rather than being split mid-sentence.

/// Upper bound on packed chunk size, in characters.
const MAX_CHUNK_CHARS: usize = 1200;

/// Split a document body into retrieval chunks.
#[must_use]
pub fn chunk_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(paragraph);
        } else if current.len() + 2 + paragraph.len() <= MAX_CHUNK_CHARS {
            current.push_str("\n\n");
            current.push_str(paragraph);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(paragraph);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
