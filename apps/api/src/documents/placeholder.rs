//! Stand-in output for document generation. There is no generation pipeline;
//! these strings are what `POST /documents/generate` stores.

use crate::models::document::DocumentType;

pub fn placeholder_title(document_type: DocumentType) -> String {
    format!("Generated {}", capitalize(document_type.as_str()))
}

pub fn placeholder_content(document_type: DocumentType) -> String {
    format!("This is a placeholder for a generated {}", document_type.as_str())
}

// Uppercases the first character only: "cover_letter" -> "Cover_letter".
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
