//! Structured-data profile selection and JSON-LD emission.
//!
//! Precedence per page: explicit front matter `schema` override, then the
//! collection-kind default (a `news` collection gets NewsArticle over the
//! generic Article), then disabled.

use crate::config::{CollectionSpec, SiteSpec};
use crate::content::ContentItem;
use serde_json::{Value, json};

/// schema.org profile shapes this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Article,
    NewsArticle,
    FaqPage,
    HowTo,
    Product,
}

impl Profile {
    /// schema.org type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::NewsArticle => "NewsArticle",
            Self::FaqPage => "FAQPage",
            Self::HowTo => "HowTo",
            Self::Product => "Product",
        }
    }

    /// Parse a profile name, tolerant of case and separators.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "article" => Some(Self::Article),
            "newsarticle" => Some(Self::NewsArticle),
            "faqpage" | "faq" => Some(Self::FaqPage),
            "howto" => Some(Self::HowTo),
            "product" => Some(Self::Product),
            _ => None,
        }
    }

    /// Collection-kind default when structured data is enabled.
    fn for_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("news") => Self::NewsArticle,
            Some("faq") => Self::FaqPage,
            Some("howto") => Self::HowTo,
            Some("product") => Self::Product,
            _ => Self::Article,
        }
    }
}

/// Resolve the profile for one page.
pub fn resolve(spec: &SiteSpec, collection: &CollectionSpec, item: &ContentItem) -> Option<Profile> {
    if let Some(name) = &item.schema {
        if name.eq_ignore_ascii_case("none") {
            return None;
        }
        return Profile::from_name(name);
    }
    if !spec.structured_data.enable {
        return None;
    }
    Some(Profile::for_kind(collection.kind.as_deref()))
}

/// Build the JSON-LD object for one page.
pub fn json_ld(profile: Profile, title: &str, url: &str, spec: &SiteSpec) -> Value {
    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": profile.as_str(),
        "headline": title,
        "url": format!("{}{}", spec.base_url_trimmed(), url),
    });
    if let Some(publisher) = &spec.structured_data.publisher {
        let mut org = json!({ "@type": "Organization", "name": publisher });
        if let Some(logo) = &spec.structured_data.logo {
            org["logo"] = json!(logo);
        }
        doc["publisher"] = org;
    }
    doc
}
