//! Admin form inputs and their rules.

use crate::validation::{FieldErrors, Validate};
use pharmasite_common::defaults::ADMIN_ICONS;
use pharmasite_common::{AdminSettings, FooterSettings, ImageEffect, NavLink, WebsiteSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub specifications: String,
    pub applications: String,
    pub image_url: String,
    pub image_effect: Option<String>,
}

impl Validate for ProductForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .min_len("name", &self.name, 3, "Name must be at least 3 characters.")
            .min_len("category", &self.category, 1, "Please select a category.")
            .min_len(
                "description",
                &self.description,
                10,
                "Description must be at least 10 characters.",
            )
            .min_len(
                "specifications",
                &self.specifications,
                10,
                "Specifications must be at least 10 characters.",
            )
            .min_len(
                "applications",
                &self.applications,
                10,
                "Applications must be at least 10 characters.",
            );

        if let Some(effect) = &self.image_effect {
            errors.one_of("imageEffect", effect, &ImageEffect::ALL, "Please select a valid image effect.");
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPostForm {
    pub title: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
}

impl Validate for BlogPostForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .min_len("title", &self.title, 3, "Title must be at least 3 characters.")
            .min_len("author", &self.author, 2, "Author name is too short.")
            .min_len("category", &self.category, 2, "Category is too short.")
            .min_len("summary", &self.summary, 10, "Summary must be at least 10 characters.")
            .min_len("content", &self.content, 20, "Content is too short.");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryForm {
    pub name: String,
}

impl Validate for CategoryForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("name", &self.name, "Category name cannot be empty.");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl Validate for ContactForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .min_len("name", &self.name, 2, "Name is too short.")
            .email("email", &self.email, "Invalid email address.")
            .min_len("subject", &self.subject, 5, "Subject is too short.")
            .min_len("message", &self.message, 10, "Message is too short.");
        errors.into_result()
    }
}

/// Input of the raw-material sourcing assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcingRequest {
    pub current_product_range: String,
    pub market_trends: String,
}

impl Validate for SourcingRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .min_len(
                "currentProductRange",
                &self.current_product_range,
                10,
                "Current product range is too short.",
            )
            .min_len("marketTrends", &self.market_trends, 10, "Market trends description is too short.");
        errors.into_result()
    }
}

/// Input of the content suggestion assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSuggestionRequest {
    pub brand_keywords: String,
    pub product_description: String,
    pub mission_statement: String,
    pub vision_statement: String,
    pub company_values: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_content: Option<String>,
}

impl Validate for ContentSuggestionRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .min_len("brandKeywords", &self.brand_keywords, 5, "Please enter some brand keywords.")
            .min_len("productDescription", &self.product_description, 10, "Please describe the product.")
            .min_len(
                "missionStatement",
                &self.mission_statement,
                10,
                "Please provide the mission statement.",
            )
            .min_len("visionStatement", &self.vision_statement, 10, "Please provide the vision statement.")
            .min_len("companyValues", &self.company_values, 10, "Please list company values.");
        errors.into_result()
    }
}

fn validate_links(errors: &mut FieldErrors, field: &str, links: &[NavLink], require_icon: bool) {
    for (i, link) in links.iter().enumerate() {
        let mut nested = FieldErrors::new();
        nested
            .required("href", &link.href, "Href is required")
            .required("label", &link.label, "Label is required");

        if require_icon {
            match link.icon.as_deref() {
                None | Some("") => nested.add("icon", "Icon is required"),
                Some(icon) => {
                    nested.one_of("icon", icon, &ADMIN_ICONS, "Unknown icon");
                }
            }
        }

        errors.extend_nested(&format!("{}.{}", field, i), nested);
    }
}

impl Validate for WebsiteSettings {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("brandName", &self.brand_name, "Brand name is required");
        validate_links(&mut errors, "navLinks", &self.nav_links, false);
        errors.into_result()
    }
}

impl Validate for AdminSettings {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("brandName", &self.brand_name, "Brand name is required");
        validate_links(&mut errors, "navLinks", &self.nav_links, true);
        errors.into_result()
    }
}

impl Validate for FooterSettings {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors
            .required("brandName", &self.brand_name, "Brand name is required")
            .required("description", &self.description, "Description is required")
            .required("ctaLabel", &self.cta_label, "CTA label is required")
            .required("ctaHref", &self.cta_href, "CTA href is required")
            .required("quickLinksTitle", &self.quick_links_title, "Title is required")
            .required("contactInfoTitle", &self.contact_info_title, "Title is required")
            .required("address", &self.address, "Address is required")
            .email("email", &self.email, "Invalid email address.")
            .required("phone", &self.phone, "Phone is required")
            .required("copyright", &self.copyright, "Copyright is required");
        validate_links(&mut errors, "quickLinks", &self.quick_links, false);
        errors.into_result()
    }
}

/// Free-form content of one public page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContent(pub Value);

impl Validate for PageContent {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !self.0.is_object() {
            errors.add("content", "Page content must be an object.");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmasite_common::defaults;

    fn product() -> ProductForm {
        ProductForm {
            name: "Paracetamol 650mg".to_string(),
            category: "Tablets".to_string(),
            description: "Analgesic and antipyretic tablet.".to_string(),
            specifications: "650mg per tablet, IP grade".to_string(),
            applications: "Pain relief and fever management".to_string(),
            image_url: String::new(),
            image_effect: None,
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_product_messages() {
        let form = ProductForm {
            name: "Pa".to_string(),
            category: String::new(),
            image_effect: Some("sparkle".to_string()),
            ..product()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 3 characters."));
        assert_eq!(errors.get("category"), Some("Please select a category."));
        assert!(errors.contains("imageEffect"));
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_blog_rules() {
        let errors = BlogPostForm {
            title: "Hi".to_string(),
            author: "A".to_string(),
            category: "News".to_string(),
            summary: "Short".to_string(),
            content: "Too short".to_string(),
            image_url: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("content"), Some("Content is too short."));
    }

    #[test]
    fn test_category_blank() {
        let errors = CategoryForm { name: "   ".to_string() }.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Category name cannot be empty."));
    }

    #[test]
    fn test_contact_email() {
        let form = ContactForm {
            name: "Asha".to_string(),
            email: "asha-at-example".to_string(),
            subject: "Bulk order".to_string(),
            message: "Please send a quote for 50kg.".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(defaults::website_settings().validate().is_ok());
        assert!(defaults::admin_settings().validate().is_ok());
        assert!(defaults::footer_settings().validate().is_ok());
    }

    #[test]
    fn test_admin_link_needs_known_icon() {
        let mut settings = defaults::admin_settings();
        settings.nav_links[1].icon = Some("Rocket".to_string());
        settings.nav_links[2].icon = None;

        let errors = settings.validate().unwrap_err();
        assert_eq!(errors.get("navLinks.1.icon"), Some("Unknown icon"));
        assert_eq!(errors.get("navLinks.2.icon"), Some("Icon is required"));
    }

    #[test]
    fn test_page_content_must_be_object() {
        assert!(PageContent(serde_json::json!({ "title": "About" })).validate().is_ok());
        assert!(PageContent(serde_json::json!(["x"])).validate().is_err());
    }
}
