//! Application context tying the assembler, the store and the logo set
//! together for a front end.

use std::path::PathBuf;

use tracing::warn;

use crate::assembler::{BannerAssembler, RenderedBanner};
use crate::config::BannerConfig;
use crate::error::{BannerError, BannerResult};
use crate::logos::{LogoAsset, discover_logos};
use crate::request::BannerRequest;
use crate::store::{BannerRecord, BannerStore};

/// Everything a request handler needs, constructed once and passed around.
///
/// ```no_run
/// use banner_renderer::{BannerApp, BannerConfig, BannerRequest};
///
/// let mut app = BannerApp::new(BannerConfig::default())?;
/// let request = BannerRequest::new("assets/logos/badge.png", "https://example.com/cat.png", "Hello")
///     .with_name("hello");
/// let png = app.submit(&request, true)?;
/// println!("{}", png.display());
/// # Ok::<(), banner_renderer::BannerError>(())
/// ```
pub struct BannerApp {
    assembler: BannerAssembler,
    store: BannerStore,
}

impl BannerApp {
    pub fn new(config: BannerConfig) -> BannerResult<Self> {
        let store = BannerStore::open(&config.store_file)?;
        let assembler = BannerAssembler::new(config)?;
        Ok(Self { assembler, store })
    }

    pub fn config(&self) -> &BannerConfig {
        self.assembler.config()
    }

    pub fn assembler(&self) -> &BannerAssembler {
        &self.assembler
    }

    pub fn store(&self) -> &BannerStore {
        &self.store
    }

    /// Validates and renders `request`.
    ///
    /// With `persist` set, a named request is saved (or updated) before it is
    /// rendered, so the configuration is kept even if rendering fails.
    pub fn submit(&mut self, request: &BannerRequest, persist: bool) -> BannerResult<PathBuf> {
        self.submit_detailed(request, persist).map(|r| r.path)
    }

    /// Like [`submit`](Self::submit) but returns the layout as well.
    pub fn submit_detailed(
        &mut self,
        request: &BannerRequest,
        persist: bool,
    ) -> BannerResult<RenderedBanner> {
        request.validate()?;
        if persist && request.name.is_some() {
            self.store.upsert(request)?;
        }

        self.assembler.render(request).inspect_err(|e| {
            warn!(error = %e, retryable = e.is_retryable(), "banner generation failed");
        })
    }

    /// The stored request named `name`, for re-editing.
    pub fn load(&self, name: &str) -> Option<BannerRequest> {
        self.store.get(name).map(BannerRecord::to_request)
    }

    /// Renders the stored banner named `name` again.
    pub fn regenerate(&self, name: &str) -> BannerResult<PathBuf> {
        let request = self
            .load(name)
            .ok_or_else(|| BannerError::store(format!("no banner named '{name}'")))?;
        self.assembler.generate(&request)
    }

    pub fn banners(&self) -> Vec<&BannerRecord> {
        self.store.list()
    }

    pub fn delete(&mut self, name: &str) -> BannerResult<Option<BannerRecord>> {
        self.store.remove(name)
    }

    pub fn logos(&self) -> BannerResult<Vec<LogoAsset>> {
        discover_logos(&self.config().logo_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_png;
    use image::Rgba;
    use std::path::Path;

    fn app(root: &Path) -> BannerApp {
        let config = BannerConfig {
            images_dir: root.join("images"),
            logo_dir: root.join("logos"),
            store_file: root.join("banners.json"),
            ..BannerConfig::default()
        };
        BannerApp::new(config).unwrap()
    }

    fn local_request(root: &Path) -> BannerRequest {
        let logo = root.join("logo.png");
        let side = root.join("side.png");
        write_png(&logo, 80, 80, Rgba([200, 0, 0, 255]));
        write_png(&side, 300, 300, Rgba([0, 0, 200, 255]));
        BannerRequest::new(logo.to_str().unwrap(), side.to_str().unwrap(), "Hello World")
    }

    #[test]
    fn submit_persists_named_request_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let request = local_request(dir.path()).with_name("hello").with_background(false);

        let png = app.submit(&request, true).unwrap();
        assert!(png.is_file());
        assert_eq!(app.load("hello"), Some(request));
        assert_eq!(app.banners().len(), 1);
    }

    #[test]
    fn submit_without_persist_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let request = local_request(dir.path()).with_name("hello");

        app.submit(&request, false).unwrap();
        assert!(app.load("hello").is_none());
        assert!(!dir.path().join("banners.json").exists());
    }

    #[test]
    fn invalid_request_is_rejected_before_storing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut request = local_request(dir.path()).with_name("hello");
        request.text.clear();

        assert!(matches!(
            app.submit(&request, true),
            Err(BannerError::InvalidRequest(_))
        ));
        assert!(app.banners().is_empty());
    }

    #[test]
    fn failed_render_still_keeps_saved_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let request = BannerRequest::new("missing-logo.png", "missing-bg.png", "x").with_name("broken");

        assert!(app.submit(&request, true).is_err());
        assert!(app.load("broken").is_some());
    }

    #[test]
    fn regenerate_and_delete_stored_banner() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let request = local_request(dir.path()).with_name("again");
        let first = app.submit(&request, true).unwrap();

        let second = app.regenerate("again").unwrap();
        assert_ne!(first, second);
        assert!(second.is_file());

        assert!(app.delete("again").unwrap().is_some());
        assert!(matches!(app.regenerate("again"), Err(BannerError::Store(_))));
    }

    #[test]
    fn logos_come_from_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("logos")).unwrap();
        write_png(&dir.path().join("logos").join("badge.png"), 4, 4, Rgba([0, 0, 0, 255]));

        let logos = app(dir.path()).logos().unwrap();
        assert_eq!(logos.len(), 1);
        assert_eq!(logos[0].name, "badge");
    }
}
