//! Maps public page paths to the admin screen that edits them.

use pharmasite_store::Principal;
use serde::Serialize;

pub const FALLBACK_EDITOR: &str = "/admin/dashboard";

/// Exact public path to editor path, checked in order
const EDITORS: [(&str, &str); 7] = [
    ("/", "/admin/home"),
    ("/about", "/admin/about-content"),
    ("/products", "/admin/products-content"),
    ("/services", "/admin/services-content"),
    ("/quality", "/admin/quality-content"),
    ("/blog", "/admin/blog"),
    ("/contact", "/admin/settings"),
];

/// Paths that are editor or system pages themselves
const NO_EDITOR: [&str; 3] = ["/admin", "/api", "/login"];

/// Floating "edit this page" button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAffordance {
    pub editor_path: String,
    pub label: &'static str,
}

fn normalize(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let path = &path[..end];
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn under<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)?.strip_prefix('/')
}

/// Editor for `path`, or `None` when the page is itself part of the admin
pub fn resolve_editor_path(path: &str) -> Option<String> {
    let path = normalize(path);

    if NO_EDITOR
        .iter()
        .any(|prefix| path == *prefix || under(path, prefix).is_some())
    {
        return None;
    }

    if let Some((_, editor)) = EDITORS.iter().find(|(public, _)| *public == path) {
        return Some(editor.to_string());
    }

    if let Some(slug) = under(path, "/products").filter(|s| !s.is_empty() && !s.contains('/')) {
        return Some(format!("/admin/products/edit/{}", slug));
    }

    // Posts are addressed by slug but edited by id; the list is the best we can do
    if under(path, "/blog").is_some_and(|s| !s.is_empty()) {
        return Some("/admin/blog".to_string());
    }

    Some(FALLBACK_EDITOR.to_string())
}

/// Only signed-in viewers get the button; the store's rules still decide
/// whether their saves go through.
pub fn edit_affordance(path: &str, viewer: &Principal) -> Option<EditAffordance> {
    if !viewer.is_authenticated() {
        return None;
    }

    resolve_editor_path(path).map(|editor_path| EditAffordance {
        editor_path,
        label: "Edit Page",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        assert_eq!(resolve_editor_path("/").as_deref(), Some("/admin/home"));
        assert_eq!(resolve_editor_path("/about").as_deref(), Some("/admin/about-content"));
        assert_eq!(resolve_editor_path("/contact").as_deref(), Some("/admin/settings"));
        assert_eq!(resolve_editor_path("/blog").as_deref(), Some("/admin/blog"));
    }

    #[test]
    fn test_product_detail_uses_slug() {
        assert_eq!(
            resolve_editor_path("/products/amoxicillin").as_deref(),
            Some("/admin/products/edit/amoxicillin")
        );
    }

    #[test]
    fn test_blog_detail_falls_back_to_list() {
        assert_eq!(resolve_editor_path("/blog/new-plant").as_deref(), Some("/admin/blog"));
    }

    #[test]
    fn test_unknown_route() {
        assert_eq!(resolve_editor_path("/unknown-route").as_deref(), Some(FALLBACK_EDITOR));
        assert_eq!(resolve_editor_path("/products/a/b").as_deref(), Some(FALLBACK_EDITOR));
    }

    #[test]
    fn test_normalizes_query_fragment_and_slash() {
        assert_eq!(resolve_editor_path("/about/?ref=nav").as_deref(), Some("/admin/about-content"));
        assert_eq!(resolve_editor_path("/#top").as_deref(), Some("/admin/home"));
        assert_eq!(resolve_editor_path("").as_deref(), Some("/admin/home"));
    }

    #[test]
    fn test_admin_pages_have_no_editor() {
        assert_eq!(resolve_editor_path("/admin"), None);
        assert_eq!(resolve_editor_path("/admin/products"), None);
        assert_eq!(resolve_editor_path("/api/pages/home"), None);
        assert_eq!(resolve_editor_path("/login"), None);
        // Only whole segments count
        assert_eq!(resolve_editor_path("/administration").as_deref(), Some(FALLBACK_EDITOR));
    }

    #[test]
    fn test_affordance_needs_a_signed_in_viewer() {
        assert!(edit_affordance("/about", &Principal::Anonymous).is_none());
        assert!(edit_affordance("/admin/blog", &Principal::editor("e@x.com")).is_none());

        let affordance = edit_affordance("/about", &Principal::viewer("v@x.com")).unwrap();
        assert_eq!(affordance.editor_path, "/admin/about-content");
    }
}
