//! Save flows for each kind of site content.
//!
//! These build the stored document from a form (deriving slugs, stamping
//! dates, filling defaults) and hand it to [`EditSession`].

use crate::forms::{BlogPostForm, CategoryForm, ContactForm, PageContent, ProductForm};
use crate::mutations::Mutation;
use crate::session::{EditSession, NextStep, Notification, SaveFailure, SavePlan, SaveResult, UNKNOWN_TEXT};
use chrono::Utc;
use pharmasite_common::path::{BLOGS, CONTACT_MESSAGES, PRODUCTS, PRODUCT_CATEGORIES};
use pharmasite_common::{
    defaults, slugify, AdminSettings, BlogPost, CommonError, CommonResult, ContactMessage, DocPath,
    FooterSettings, ImageEffect, PageName, Product, ProductCategory, SettingsName, WebsiteSettings,
};
use pharmasite_store::{to_fields, Fields};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

pub const PRODUCT_LIST: &str = "/admin/products";
pub const BLOG_LIST: &str = "/admin/blog";

/// Stored product for a validated form; the slug always follows the name
pub fn product_document(form: &ProductForm) -> CommonResult<Product> {
    let image_effect = match &form.image_effect {
        Some(effect) => effect.parse()?,
        None => ImageEffect::default(),
    };

    Ok(Product {
        id: String::new(),
        name: form.name.clone(),
        slug: slugify(&form.name),
        category: form.category.clone(),
        description: form.description.clone(),
        specifications: form.specifications.clone(),
        applications: form.applications.clone(),
        image_url: form.image_url.clone(),
        image_effect,
    })
}

/// Stored post for a validated form, dated `date`
pub fn blog_document(form: &BlogPostForm, date: String) -> BlogPost {
    BlogPost {
        id: String::new(),
        slug: slugify(&form.title),
        title: form.title.clone(),
        date,
        author: form.author.clone(),
        category: form.category.clone(),
        summary: form.summary.clone(),
        content: form.content.clone(),
        image_url: form.image_url.clone(),
    }
}

/// Page content as written; the About page always carries its values list
pub fn page_document(page: PageName, content: &PageContent) -> CommonResult<Fields> {
    let Value::Object(mut fields) = content.0.clone() else {
        return Err(CommonError::Malformed("page content must be an object".to_string()));
    };

    if page == PageName::About {
        let missing = fields
            .get("values")
            .map_or(true, |v| v.as_array().map_or(true, Vec::is_empty));
        if missing {
            fields.insert("values".to_string(), defaults::about_values());
        }
    }

    Ok(fields)
}

fn doc_path(collection: &str, id: &str) -> CommonResult<DocPath> {
    DocPath::new(collection, id)
}

fn upsert(collection: &str, id: Option<&str>, data: Fields) -> CommonResult<Mutation> {
    Ok(match id {
        Some(id) => Mutation::Update {
            path: doc_path(collection, id)?,
            data,
        },
        None => Mutation::Create {
            collection: collection.to_string(),
            data,
        },
    })
}

fn form_key(collection: &str, id: Option<&str>) -> String {
    format!("{}/{}", collection, id.unwrap_or("new"))
}

/// Plan that deletes one document, reporting with `noun`
pub fn delete_plan(path: DocPath, noun: &str) -> SavePlan {
    SavePlan {
        form: path.to_string(),
        mutation: Mutation::Delete { path },
        success: Notification::success("Success", format!("{} has been deleted.", noun)),
        failure_title: "Delete Failed".to_string(),
        next: NextStep::Stay,
    }
}

fn settings_plan<T: Serialize>(name: SettingsName, settings: &T) -> CommonResult<SavePlan> {
    let label = match name {
        SettingsName::Website => "Website",
        SettingsName::Admin => "Admin",
        SettingsName::Footer => "Footer",
    };

    Ok(SavePlan {
        form: name.doc_path().to_string(),
        mutation: Mutation::Merge {
            path: name.doc_path(),
            data: to_fields(settings)?,
        },
        success: Notification::success("Success", format!("{} settings have been updated.", label)),
        failure_title: "Save Failed".to_string(),
        next: NextStep::Reload,
    })
}

fn page_label(page: PageName) -> &'static str {
    match page {
        PageName::Home => "Homepage",
        PageName::About => "About page",
        PageName::Products => "Products page",
        PageName::Services => "Services page",
        PageName::Quality => "Quality page",
    }
}

impl EditSession {
    async fn delete_one(&self, collection: &str, id: &str, noun: &str) -> SaveResult {
        match doc_path(collection, id) {
            Ok(path) => self.run(delete_plan(path, noun)).await,
            Err(e) => Err(SaveFailure {
                error: e.into(),
                notification: Notification::destructive("Delete Failed", UNKNOWN_TEXT),
            }),
        }
    }

    /// Create a product, or update the one with `id`
    pub async fn save_product(&self, form: &ProductForm, id: Option<&str>) -> SaveResult {
        self.save(form, |form| {
            let data = to_fields(&product_document(form)?)?;
            let (verb, failure) = if id.is_some() {
                ("updated", "Update Failed")
            } else {
                ("added", "Save Failed")
            };

            Ok(SavePlan {
                form: form_key(PRODUCTS, id),
                mutation: upsert(PRODUCTS, id, data)?,
                success: Notification::success("Success!", format!("Product has been {}.", verb)),
                failure_title: failure.to_string(),
                next: NextStep::Navigate(PRODUCT_LIST.to_string()),
            })
        })
        .await
    }

    pub async fn delete_product(&self, id: &str) -> SaveResult {
        self.delete_one(PRODUCTS, id, "Product").await
    }

    /// Create a post dated now, or update the one with `id` keeping its date
    pub async fn save_blog_post(&self, form: &BlogPostForm, id: Option<&str>) -> SaveResult {
        self.save(form, |form| {
            let mut data = to_fields(&blog_document(form, Utc::now().to_rfc3339()))?;
            if id.is_some() {
                data.remove("date");
            }
            let (verb, failure) = if id.is_some() {
                ("updated", "Update Failed")
            } else {
                ("published", "Save Failed")
            };

            Ok(SavePlan {
                form: form_key(BLOGS, id),
                mutation: upsert(BLOGS, id, data)?,
                success: Notification::success("Success!", format!("Blog post has been {}.", verb)),
                failure_title: failure.to_string(),
                next: NextStep::Navigate(BLOG_LIST.to_string()),
            })
        })
        .await
    }

    pub async fn delete_blog_post(&self, id: &str) -> SaveResult {
        self.delete_one(BLOGS, id, "Blog post").await
    }

    pub async fn add_category(&self, form: &CategoryForm) -> SaveResult {
        self.save(form, |form| {
            let category = ProductCategory {
                id: String::new(),
                name: form.name.trim().to_string(),
            };
            Ok(SavePlan {
                form: form_key(PRODUCT_CATEGORIES, None),
                mutation: Mutation::Create {
                    collection: PRODUCT_CATEGORIES.to_string(),
                    data: to_fields(&category)?,
                },
                success: Notification::success("Success", "Category added."),
                failure_title: "Add Failed".to_string(),
                next: NextStep::Stay,
            })
        })
        .await
    }

    /// Renames do not touch products that copied the old name
    pub async fn rename_category(&self, id: &str, form: &CategoryForm) -> SaveResult {
        self.save(form, |form| {
            Ok(SavePlan {
                form: form_key(PRODUCT_CATEGORIES, Some(id)),
                mutation: Mutation::Update {
                    path: doc_path(PRODUCT_CATEGORIES, id)?,
                    data: to_fields(&ProductCategory {
                        id: String::new(),
                        name: form.name.trim().to_string(),
                    })?,
                },
                success: Notification::success("Success", "Category updated."),
                failure_title: "Update Failed".to_string(),
                next: NextStep::Stay,
            })
        })
        .await
    }

    pub async fn delete_category(&self, id: &str) -> SaveResult {
        self.delete_one(PRODUCT_CATEGORIES, id, "Category").await
    }

    /// Merge into `pages/{page}`, creating it on first save
    pub async fn save_page(&self, page: PageName, content: &PageContent) -> SaveResult {
        self.save(content, |content| {
            Ok(SavePlan {
                form: page.doc_path().to_string(),
                mutation: Mutation::Merge {
                    path: page.doc_path(),
                    data: page_document(page, content)?,
                },
                success: Notification::success(
                    "Update Successful",
                    format!("{} content has been saved. The page will now reload.", page_label(page)),
                ),
                failure_title: "Save Failed".to_string(),
                next: NextStep::Reload,
            })
        })
        .await
    }

    pub async fn save_website_settings(&self, settings: &WebsiteSettings) -> SaveResult {
        self.save(settings, |s| settings_plan(SettingsName::Website, s)).await
    }

    pub async fn save_admin_settings(&self, settings: &AdminSettings) -> SaveResult {
        self.save(settings, |s| settings_plan(SettingsName::Admin, s)).await
    }

    pub async fn save_footer_settings(&self, settings: &FooterSettings) -> SaveResult {
        self.save(settings, |s| settings_plan(SettingsName::Footer, s)).await
    }

    /// Store a contact form submission
    pub async fn submit_contact(&self, form: &ContactForm) -> SaveResult {
        let result = self
            .save(form, |form| {
                let message = ContactMessage {
                    name: form.name.clone(),
                    email: form.email.clone(),
                    subject: form.subject.clone(),
                    message: form.message.clone(),
                    received_at: Utc::now().to_rfc3339(),
                };
                Ok(SavePlan {
                    form: form_key(CONTACT_MESSAGES, None),
                    mutation: Mutation::Create {
                        collection: CONTACT_MESSAGES.to_string(),
                        data: to_fields(&message)?,
                    },
                    success: Notification::success(
                        "Message Sent",
                        "Thank you for your message! We will get back to you shortly.",
                    ),
                    failure_title: "Send Failed".to_string(),
                    next: NextStep::Stay,
                })
            })
            .await;

        if result.is_ok() {
            info!(email = %form.email, subject = %form.subject, "New contact form submission");
        }
        result
    }
}
