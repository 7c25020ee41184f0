//! Banner requests.

use serde::{Deserialize, Serialize};

use crate::error::{BannerError, BannerResult};
use crate::source::ImageReference;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_IMAGE_REF_LEN: usize = 500;
pub const MAX_TEXT_LEN: usize = 500;

/// Everything needed to render one banner.
///
/// `logo` and `image` are reference strings: a local path or an http(s) URL
/// (see [`ImageReference`]). The name is only needed to persist the banner.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "weekly-digest",
///   "logo": "assets/logos/badge.png",
///   "image": "https://example.com/photo.jpg",
///   "text": "New articles every Monday",
///   "background": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Primary image, pasted on the left.
    pub logo: String,

    /// Secondary image, used as background or pasted on the right.
    pub image: String,

    pub text: String,

    /// Use the secondary image as a full-canvas background.
    #[serde(default = "default_true")]
    pub background: bool,
}

fn default_true() -> bool {
    true
}

impl BannerRequest {
    /// Creates an unnamed request that uses the secondary image as background.
    pub fn new(logo: impl Into<String>, image: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: None,
            logo: logo.into(),
            image: image.into(),
            text: text.into(),
            background: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub fn logo_ref(&self) -> ImageReference {
        ImageReference::parse(&self.logo)
    }

    pub fn image_ref(&self) -> ImageReference {
        ImageReference::parse(&self.image)
    }

    /// Checks required fields and length limits.
    pub fn validate(&self) -> BannerResult<()> {
        if let Some(name) = &self.name {
            require("name", name, MAX_NAME_LEN)?;
        }
        if self.logo.trim().is_empty() {
            return Err(BannerError::invalid_request("logo is required"));
        }
        require("image", &self.image, MAX_IMAGE_REF_LEN)?;
        require("text", &self.text, MAX_TEXT_LEN)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn require(field: &str, value: &str, max_len: usize) -> BannerResult<()> {
    if value.trim().is_empty() {
        return Err(BannerError::invalid_request(format!("{field} is required")));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(BannerError::invalid_request(format!(
            "{field} is {len} characters, at most {max_len} allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BannerRequest {
        BannerRequest::new("logo.png", "http://example/img.png", "Hello World")
    }

    #[test]
    fn builder_sets_fields() {
        let req = request().with_name("hello").with_background(false);
        assert_eq!(req.name.as_deref(), Some("hello"));
        assert!(!req.background);
        assert!(req.image_ref().is_remote());
        assert!(!req.logo_ref().is_remote());
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
        assert!(request().with_name("n").validate().is_ok());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut req = request();
        req.text = "   ".into();
        assert!(matches!(req.validate(), Err(BannerError::InvalidRequest(_))));

        let mut req = request();
        req.image = String::new();
        assert!(req.validate().is_err());

        let mut req = request();
        req.logo = String::new();
        assert!(req.validate().is_err());

        assert!(request().with_name(" ").validate().is_err());
    }

    #[test]
    fn length_limits_are_enforced() {
        assert!(request().with_name("n".repeat(100)).validate().is_ok());
        assert!(request().with_name("n".repeat(101)).validate().is_err());

        let mut req = request();
        req.text = "t".repeat(501);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("at most 500"));
    }

    #[test]
    fn json_defaults_background_and_omits_missing_name() {
        let req = BannerRequest::from_json(r#"{"logo":"a.png","image":"b.png","text":"hi"}"#).unwrap();
        assert!(req.background);
        assert!(req.name.is_none());

        let json = req.to_json().unwrap();
        assert!(!json.contains("\"name\""));
        assert_eq!(BannerRequest::from_json(&json).unwrap(), req);
    }
}
