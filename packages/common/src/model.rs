//! Document shapes stored in the content store.
//!
//! Documents are schemaless JSON objects; these types are the typed views the
//! admin flows read and write. The document id is carried outside the stored
//! data and filled in on read, so `id` is skipped when empty.

use crate::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anything addressable by a document id
pub trait Keyed {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageEffect {
    #[default]
    CenterFill,
    BlurBackground,
    SolidBackground,
}

impl ImageEffect {
    pub const ALL: [&'static str; 3] = ["center-fill", "blur-background", "solid-background"];
}

impl FromStr for ImageEffect {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center-fill" => Ok(ImageEffect::CenterFill),
            "blur-background" => Ok(ImageEffect::BlurBackground),
            "solid-background" => Ok(ImageEffect::SolidBackground),
            other => Err(CommonError::Malformed(format!("unknown image effect: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Category name copied at save time, not a reference
    pub category: String,
    pub description: String,
    pub specifications: String,
    pub applications: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_effect: ImageEffect,
}

impl Keyed for Product {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

impl Keyed for ProductCategory {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    pub title: String,
    /// RFC 3339 timestamp, stamped at creation
    pub date: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    /// Raw markup
    pub content: String,
    #[serde(default)]
    pub image_url: String,
}

impl Keyed for BlogPost {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub received_at: String,
}

/// Navigation entry used by the website header and the admin sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoType {
    #[default]
    Svg,
    Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSettings {
    pub brand_name: String,
    #[serde(default)]
    pub logo_type: LogoType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub nav_links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    pub brand_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub nav_links: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterSettings {
    pub brand_name: String,
    pub description: String,
    pub cta_label: String,
    pub cta_href: String,
    pub quick_links_title: String,
    pub quick_links: Vec<NavLink>,
    pub contact_info_title: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub copyright: String,
}

/// Editable public pages, each backed by `pages/{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageName {
    Home,
    About,
    Products,
    Services,
    Quality,
}

impl PageName {
    pub const ALL: [PageName; 5] = [
        PageName::Home,
        PageName::About,
        PageName::Products,
        PageName::Services,
        PageName::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageName::Home => "home",
            PageName::About => "about",
            PageName::Products => "products",
            PageName::Services => "services",
            PageName::Quality => "quality",
        }
    }

    pub fn doc_path(&self) -> crate::DocPath {
        crate::DocPath::from_static(crate::path::PAGES, self.as_str())
    }
}

impl FromStr for PageName {
    type Err = CommonError;

    fn from_str(s: &str) -> CommonResult<Self> {
        PageName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CommonError::UnknownPage(s.to_string()))
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Singleton settings documents under `settings/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsName {
    Website,
    Admin,
    Footer,
}

impl SettingsName {
    pub const ALL: [SettingsName; 3] = [SettingsName::Website, SettingsName::Admin, SettingsName::Footer];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsName::Website => "website",
            SettingsName::Admin => "admin",
            SettingsName::Footer => "footer",
        }
    }

    pub fn doc_path(&self) -> crate::DocPath {
        crate::DocPath::from_static(crate::path::SETTINGS, self.as_str())
    }
}

impl FromStr for SettingsName {
    type Err = CommonError;

    fn from_str(s: &str) -> CommonResult<Self> {
        SettingsName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| CommonError::UnknownSettings(s.to_string()))
    }
}

impl fmt::Display for SettingsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_shape() {
        let json = serde_json::json!({
            "name": "Paracetamol 650mg",
            "slug": "paracetamol-650mg",
            "category": "Tablets",
            "description": "Analgesic and antipyretic.",
            "specifications": "650mg per tablet, IP grade",
            "applications": "Pain relief and fever",
            "imageUrl": "/uploads/p.png",
            "imageEffect": "blur-background"
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.image_effect, ImageEffect::BlurBackground);
        assert!(product.id.is_empty());

        let back = serde_json::to_value(&product).unwrap();
        assert!(back.get("id").is_none());
        assert_eq!(back["imageUrl"], "/uploads/p.png");
    }

    #[test]
    fn test_page_and_settings_names() {
        assert_eq!("quality".parse::<PageName>().unwrap(), PageName::Quality);
        assert!("careers".parse::<PageName>().is_err());
        assert_eq!(PageName::About.doc_path().to_string(), "pages/about");
        assert_eq!(SettingsName::Footer.doc_path().to_string(), "settings/footer");
        assert!("secrets".parse::<SettingsName>().is_err());
    }

    #[test]
    fn test_nav_link_visible_defaults_true() {
        let link: NavLink = serde_json::from_str(r#"{"href":"/","label":"Home"}"#).unwrap();
        assert!(link.visible);
        assert!(link.icon.is_none());
    }
}
