//! Hierarchical document addresses (`collection/id`).

use crate::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PAGES: &str = "pages";
pub const PRODUCTS: &str = "products";
pub const PRODUCT_CATEGORIES: &str = "productCategories";
pub const BLOGS: &str = "blogs";
pub const SETTINGS: &str = "settings";
pub const CONTACT_MESSAGES: &str = "contactMessages";

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath {
    collection: String,
    id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> CommonResult<Self> {
        let collection = collection.into();
        let id = id.into();

        if !is_valid_segment(&collection) || !is_valid_segment(&id) {
            return Err(CommonError::InvalidPath(format!("{}/{}", collection, id)));
        }

        Ok(Self { collection, id })
    }

    /// Build from compile-time segments known to be valid
    pub(crate) fn from_static(collection: &'static str, id: &'static str) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Parse `collection/id`, tolerating a leading `/`
    pub fn parse(raw: &str) -> CommonResult<Self> {
        let trimmed = raw.strip_prefix('/').unwrap_or(raw);
        let mut parts = trimmed.split('/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(collection), Some(id), None) => Self::new(collection, id),
            _ => Err(CommonError::InvalidPath(raw.to_string())),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.chars().any(char::is_control)
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl TryFrom<String> for DocPath {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.to_string()
    }
}
