//! # Canonical URLs
//!
//! Builds the single-view, edit, and delete URLs the projection exposes.
//! The base is validated once at construction; every URL afterwards is a
//! plain path appended to it, so building one cannot fail.

use url::Url;

use crate::error::UrlError;
use crate::identity::{AgentId, FileId, ProjectId, RegistrationId};

/// Canonical URL builder rooted at the site's public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    /// Normalized base, always ending in `/`.
    base: String,
}

impl UrlBuilder {
    /// Validate `base` and normalize it to end with a slash.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an absolute URL or cannot carry a
    /// path (e.g. `mailto:`).
    pub fn new(base: &str) -> Result<Self, UrlError> {
        let parsed = Url::parse(base).map_err(|source| UrlError::InvalidBase {
            url: base.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(UrlError::CannotBeABase(base.to_string()));
        }
        let mut base = parsed.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn registration_single(&self, id: RegistrationId) -> String {
        format!("{}registration/{}/", self.base, id.0)
    }

    pub fn registration_edit(&self, id: RegistrationId) -> String {
        format!("{}registration/edit/{}/", self.base, id.0)
    }

    pub fn agent_single(&self, id: AgentId) -> String {
        format!("{}agent/{}/", self.base, id.0)
    }

    pub fn project_single(&self, id: ProjectId) -> String {
        format!("{}project/{}/", self.base, id.0)
    }

    pub fn file_delete(&self, id: FileId) -> String {
        format!("{}file/delete/{}/", self.base, id.0)
    }
}

/// Local development base, `http://localhost:8080/`.
impl Default for UrlBuilder {
    fn default() -> Self {
        Self {
            base: "http://localhost:8080/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_normalized_with_trailing_slash() {
        let urls = UrlBuilder::new("https://mapas.example.org").unwrap();
        assert_eq!(urls.base(), "https://mapas.example.org/");
        let nested = UrlBuilder::new("https://example.org/portal").unwrap();
        assert_eq!(nested.base(), "https://example.org/portal/");
    }

    #[test]
    fn builds_entity_urls() {
        let urls = UrlBuilder::new("https://mapas.example.org/").unwrap();
        assert_eq!(
            urls.registration_single(RegistrationId(42)),
            "https://mapas.example.org/registration/42/"
        );
        assert_eq!(
            urls.registration_edit(RegistrationId(42)),
            "https://mapas.example.org/registration/edit/42/"
        );
        assert_eq!(urls.agent_single(AgentId(1)), "https://mapas.example.org/agent/1/");
        assert_eq!(urls.project_single(ProjectId(7)), "https://mapas.example.org/project/7/");
        assert_eq!(urls.file_delete(FileId(3)), "https://mapas.example.org/file/delete/3/");
    }

    #[test]
    fn rejects_relative_base() {
        assert!(matches!(
            UrlBuilder::new("not a url"),
            Err(UrlError::InvalidBase { .. })
        ));
    }

    #[test]
    fn rejects_base_without_path() {
        assert!(matches!(
            UrlBuilder::new("mailto:admin@example.org"),
            Err(UrlError::CannotBeABase(_))
        ));
    }
}
