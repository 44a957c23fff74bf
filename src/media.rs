//! Image CDN URL resolution
//!
//! Stored image fields hold either a fully-qualified URL or a bare CDN
//! public id, depending on when the document was written. Presentation code
//! always goes through [`ImageCdn::resolve`] to get something loadable.

use crate::config::ClientOptions;

/// Resolves stored image identifiers to displayable URLs
#[derive(Debug, Clone)]
pub struct ImageCdn {
    base_url: String,
    placeholder_url: String,
}

impl ImageCdn {
    /// Create a resolver from client options
    pub fn new(options: &ClientOptions) -> Self {
        Self {
            base_url: options.cdn_base_url.trim_end_matches('/').to_string(),
            placeholder_url: options.placeholder_image_url.clone(),
        }
    }

    /// Resolve an image field to a full URL.
    ///
    /// Empty input yields the placeholder; absolute URLs, local paths and
    /// blob URLs pass through untouched; anything else is treated as a CDN
    /// public id.
    pub fn resolve(&self, image: &str) -> String {
        if image.is_empty() {
            return self.placeholder_url.clone();
        }
        if image.starts_with('/') || image.starts_with("http") || image.starts_with("blob:") {
            return image.to_string();
        }
        format!("{}/{}", self.base_url, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdn() -> ImageCdn {
        ImageCdn::new(&ClientOptions::default().with_cdn_base_url("https://cdn.example.com/upload"))
    }

    #[test]
    fn empty_input_yields_placeholder() {
        assert!(cdn().resolve("").starts_with("https://placehold.co/"));
    }

    #[test]
    fn absolute_and_local_urls_pass_through() {
        let cdn = cdn();
        assert_eq!(cdn.resolve("/board1.jpg"), "/board1.jpg");
        assert_eq!(
            cdn.resolve("https://example.com/a.jpg"),
            "https://example.com/a.jpg"
        );
        assert_eq!(cdn.resolve("blob:abcd"), "blob:abcd");
    }

    #[test]
    fn public_ids_are_composed_into_cdn_urls() {
        assert_eq!(
            cdn().resolve("hoardings/board1"),
            "https://cdn.example.com/upload/hoardings/board1"
        );
    }
}
