//! Seed values for singleton documents that have never been saved.

use crate::model::{AdminSettings, FooterSettings, LogoType, NavLink, WebsiteSettings};
use chrono::Datelike;
use serde_json::{json, Value};

fn link(href: &str, label: &str) -> NavLink {
    NavLink {
        href: href.to_string(),
        label: label.to_string(),
        icon: None,
        visible: true,
    }
}

fn admin_link(href: &str, label: &str, icon: &str, visible: bool) -> NavLink {
    NavLink {
        href: href.to_string(),
        label: label.to_string(),
        icon: Some(icon.to_string()),
        visible,
    }
}

pub const BRAND_NAME: &str = "Pharmasite Remedies";

/// Icon identifiers the admin sidebar knows how to draw
pub const ADMIN_ICONS: [&str; 10] = [
    "LayoutDashboard",
    "Package",
    "Bot",
    "LogOut",
    "ArrowLeftSquare",
    "Settings",
    "Upload",
    "FilePenLine",
    "Newspaper",
    "Link",
];

pub fn website_settings() -> WebsiteSettings {
    WebsiteSettings {
        brand_name: BRAND_NAME.to_string(),
        logo_type: LogoType::Url,
        logo_svg: None,
        logo_url: Some("/default-logo.svg".to_string()),
        nav_links: vec![
            link("/", "Home"),
            link("/about", "About Us"),
            link("/products", "Products"),
            link("/services", "Services"),
            link("/quality", "Quality"),
            link("/blog", "Blog"),
            link("/contact", "Contact"),
        ],
    }
}

pub fn admin_settings() -> AdminSettings {
    AdminSettings {
        brand_name: "Pharmasite Admin".to_string(),
        logo_url: Some("/uploads/default-logo.svg".to_string()),
        nav_links: vec![
            admin_link("/admin/dashboard", "Dashboard", "LayoutDashboard", true),
            admin_link("/admin/products", "Products", "Package", true),
            admin_link("/admin/blog", "Blog", "Newspaper", true),
            admin_link("/admin/products-content", "Products Page Content", "FilePenLine", false),
            admin_link("/admin/ai-sourcing", "AI Sourcing", "Bot", true),
            admin_link("/admin/media", "Media", "Upload", false),
            admin_link("/admin/settings", "Site Settings", "Settings", true),
        ],
    }
}

pub fn footer_settings() -> FooterSettings {
    FooterSettings {
        brand_name: BRAND_NAME.to_string(),
        description: "Your trusted global partner for high-quality pharmaceutical and chemical raw materials, ensuring quality, compliance, and reliability.".to_string(),
        cta_label: "Request a Quote".to_string(),
        cta_href: "/contact".to_string(),
        quick_links_title: "Quick Links".to_string(),
        quick_links: vec![
            link("/products", "Products"),
            link("/about", "About Us"),
            link("/quality", "Quality"),
            link("/contact", "Contact"),
        ],
        contact_info_title: "Contact Info".to_string(),
        address: "Nagpur, Maharashtra, India".to_string(),
        email: "info@pharmasite.example".to_string(),
        phone: "+91-00000-00000".to_string(),
        copyright: format!(
            "© {} Pharmasite Remedies Pvt Ltd. All rights reserved.",
            chrono::Utc::now().year()
        ),
    }
}

/// Values list written to the About page when a save omits it
pub fn about_values() -> Value {
    json!([
        {
            "title": "Integrity",
            "description": "We uphold the highest ethical standards, ensuring transparency and trust in all our partnerships."
        },
        {
            "title": "Innovation",
            "description": "We continuously seek out advanced solutions and novel materials to help our clients stay ahead of the curve."
        },
        {
            "title": "Reliability",
            "description": "We are committed to on-time delivery and a consistent supply chain, so you can count on us."
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_links_use_known_icons() {
        for link in admin_settings().nav_links {
            let icon = link.icon.unwrap();
            assert!(ADMIN_ICONS.contains(&icon.as_str()), "unknown icon {}", icon);
        }
    }

    #[test]
    fn test_about_values_shape() {
        let values = about_values();
        assert_eq!(values.as_array().unwrap().len(), 3);
        assert_eq!(values[0]["title"], "Integrity");
    }
}
