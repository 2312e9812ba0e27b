use std::path::Path;

/// How a document is served, decided by its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Markdown,
    Rejected,
}

impl DocumentKind {
    pub fn classify(filename: &str) -> Self {
        match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
            Some("txt") => DocumentKind::PlainText,
            Some("md") => DocumentKind::Markdown,
            _ => DocumentKind::Rejected,
        }
    }

    /// Content type used when serving the raw file. The web layer renders
    /// Markdown to HTML instead, so its arm only applies to raw source.
    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text/plain",
            DocumentKind::Markdown => "text/markdown",
            DocumentKind::Rejected => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(DocumentKind::classify("changes.txt"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::classify("about.md"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::classify("archive.tar.md"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::classify("bad.ext"), DocumentKind::Rejected);
        assert_eq!(DocumentKind::classify("README"), DocumentKind::Rejected);
        assert_eq!(DocumentKind::classify("notes.TXT"), DocumentKind::Rejected);
        assert_eq!(DocumentKind::classify("notes.markdown"), DocumentKind::Rejected);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(DocumentKind::PlainText.content_type(), "text/plain");
        assert_eq!(DocumentKind::Markdown.content_type(), "text/markdown");
        assert_eq!(
            DocumentKind::classify("blob.bin").content_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert_eq!(DocumentKind::classify(".md"), DocumentKind::Rejected);
        assert_eq!(DocumentKind::classify(".txt"), DocumentKind::Rejected);
        assert_eq!(DocumentKind::classify(""), DocumentKind::Rejected);
    }
}
