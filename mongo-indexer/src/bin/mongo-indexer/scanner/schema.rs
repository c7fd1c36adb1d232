//! Types for representing scanned `IndexedModel` structs.

use mongo_indexer::ModelDescriptor;

/// A model found in source, with enough context to plan its indexes.
#[derive(Debug, Clone)]
pub struct ScannedModel {
    /// Collection name from `#[mongo_index(collection = "...")]` or the default
    pub collection: String,

    /// Descriptor built with the derive's attribute rules
    pub descriptor: ModelDescriptor,

    /// Source file path (relative to project root)
    pub source_file: String,

    /// Line number where the struct is defined
    pub source_line: usize,
}

impl ScannedModel {
    pub fn new(name: &str, source_file: String, source_line: usize) -> Self {
        Self {
            collection: default_collection(name),
            descriptor: ModelDescriptor::record(name),
            source_file,
            source_line,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// `file:line` for display.
    pub fn location(&self) -> String {
        format!("{}:{}", self.source_file, self.source_line)
    }
}

/// Pluralized snake_case struct name, matching the derive macro.
pub fn default_collection(name: &str) -> String {
    pluralize(&to_snake_case(name))
}

fn to_snake_case(name: &str) -> String {
    let mut result = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

fn pluralize(word: &str) -> String {
    if word.ends_with('s') || word.ends_with('x') || word.ends_with("ch") || word.ends_with("sh") {
        format!("{word}es")
    } else if word.ends_with('y')
        && !word.ends_with("ay")
        && !word.ends_with("ey")
        && !word.ends_with("oy")
        && !word.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collection() {
        assert_eq!(default_collection("User"), "users");
        assert_eq!(default_collection("AuditEntry"), "audit_entries");
        assert_eq!(default_collection("Address"), "addresses");
        assert_eq!(default_collection("Day"), "days");
    }
}
