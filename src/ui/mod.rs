//! Browser UI: the served page and the session model its script follows.

pub mod session;

pub use session::{ObjectUrlStore, Phase, PreviewHandle, Session, SessionError, Submission};

/// The single-page UI served at `/`.
pub const INDEX_HTML: &str = include_str!("index.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_posts_to_stylize_endpoint() {
        assert!(INDEX_HTML.contains("/api/stylize"));
        assert!(INDEX_HTML.contains(r#"value="grok""#));
        assert!(INDEX_HTML.contains(r#"value="openai""#));
    }

    #[test]
    fn test_page_releases_object_urls() {
        assert!(INDEX_HTML.contains("URL.revokeObjectURL"));
        assert!(INDEX_HTML.contains("pagehide"));
    }

    #[test]
    fn test_page_keeps_state_when_cached() {
        let (_, teardown) = INDEX_HTML
            .split_once("addEventListener('pagehide'")
            .unwrap();
        let handler = &teardown[..teardown.find("});").unwrap()];
        assert!(handler.contains("e.persisted) return"));

        // Drop suppression lasts for the page's whole lifetime
        assert!(INDEX_HTML.contains("document.addEventListener('dragover', preventDefaults)"));
        assert!(INDEX_HTML.contains("document.addEventListener('drop', preventDefaults)"));
        assert!(!INDEX_HTML.contains("document.removeEventListener"));
    }

    #[test]
    fn test_page_messages_match_session() {
        assert!(INDEX_HTML.contains(session::INVALID_FILE_MESSAGE));
        assert!(INDEX_HTML.contains(session::NO_FILE_MESSAGE));
        assert!(INDEX_HTML.contains("file.type.startsWith('image/')"));
    }
}
