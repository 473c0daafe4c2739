use garde::Validate;
use serde::{Deserialize, Serialize};

/// List-ish fields (`benefits`, `whoShouldBook`) were stored as comma-joined
/// strings before the backend moved to arrays; both shapes still occur.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultiValue {
    One(String),
    Many(Vec<String>),
}

impl MultiValue {
    pub fn into_list(self) -> Vec<String> {
        match self {
            MultiValue::One(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            MultiValue::Many(list) => list
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Category reference: a bare id or an embedded category record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCategoryRef {
    Id(String),
    Embedded {
        #[serde(default, alias = "_id")]
        id: Option<String>,
    },
}

impl RawCategoryRef {
    fn into_id(self) -> Option<String> {
        match self {
            RawCategoryRef::Id(id) => Some(id),
            RawCategoryRef::Embedded { id } => id,
        }
    }
}

/// A puja listing as stored by any historical backend version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPuja {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "pujaName")]
    pub title: Option<String>,
    #[serde(default, alias = "mainImage")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<RawCategoryRef>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub admin_commission: Option<serde_json::Value>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub why_perform: Option<String>,
    #[serde(default)]
    pub puja_details: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub benefits: Option<MultiValue>,
    #[serde(default)]
    pub who_should_book: Option<MultiValue>,
    #[serde(default)]
    pub why_you_should: Option<serde_json::Value>,
    #[serde(default)]
    pub pricing_packages: Option<serde_json::Value>,
    #[serde(default)]
    pub testimonials: Option<serde_json::Value>,
    #[serde(default)]
    pub faqs: Option<serde_json::Value>,
    #[serde(default)]
    pub gallery_images: Option<Vec<String>>,
}

impl RawPuja {
    /// Produce the canonical listing, absolutizing relative image paths
    /// against `image_base` when one is configured.
    pub fn normalize(self, image_base: Option<&str>) -> Puja {
        Puja {
            id: self.id.unwrap_or_default(),
            title: self.title,
            image_url: self.image_url.map(|url| absolutize(url, image_base)),
            category_id: self.category_id.and_then(RawCategoryRef::into_id),
            price: self.price.as_ref().and_then(super::scalar_to_string),
            admin_commission: self.admin_commission.as_ref().and_then(super::scalar_to_string),
            overview: self.overview,
            why_perform: self.why_perform,
            puja_details: self.puja_details,
            duration: self.duration,
            benefits: self.benefits.map(MultiValue::into_list).unwrap_or_default(),
            who_should_book: self.who_should_book.map(MultiValue::into_list).unwrap_or_default(),
            why_you_should: self.why_you_should.unwrap_or(serde_json::Value::Null),
            pricing_packages: self.pricing_packages.unwrap_or(serde_json::Value::Null),
            testimonials: self.testimonials.unwrap_or(serde_json::Value::Null),
            faqs: self.faqs.unwrap_or(serde_json::Value::Null),
            gallery_images: self
                .gallery_images
                .unwrap_or_default()
                .into_iter()
                .map(|url| absolutize(url, image_base))
                .collect(),
        }
    }
}

fn absolutize(url: String, base: Option<&str>) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url;
    }
    match base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
        None => url,
    }
}

/// Canonical puja listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Puja {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_commission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_perform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puja_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub benefits: Vec<String>,
    pub who_should_book: Vec<String>,
    pub why_you_should: serde_json::Value,
    pub pricing_packages: serde_json::Value,
    pub testimonials: serde_json::Value,
    pub faqs: serde_json::Value,
    pub gallery_images: Vec<String>,
}

/// Single-puja payload; returned as `{data}`, `{puja}`, or bare depending on
/// the endpoint's age.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPujaEnvelope {
    Data { data: RawPuja },
    Puja { puja: RawPuja },
    Bare(RawPuja),
}

impl RawPujaEnvelope {
    pub fn into_raw(self) -> RawPuja {
        match self {
            RawPujaEnvelope::Data { data } => data,
            RawPujaEnvelope::Puja { puja } => puja,
            RawPujaEnvelope::Bare(puja) => puja,
        }
    }
}

/// Puja category option for the listing form.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawCategoryList {
    #[serde(default)]
    pub results: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategory {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "categoryName")]
    pub name: Option<String>,
}

impl RawCategoryList {
    pub fn normalize(self) -> Vec<Category> {
        self.results
            .into_iter()
            .filter_map(|raw| {
                Some(Category {
                    id: raw.id?,
                    name: raw.name.unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Scalar fields of the create/update form, validated before anything is
/// forwarded to the backend. List fields travel as JSON-encoded strings and
/// image bytes are carried separately by the route handler.
#[derive(Debug, Clone, Default, Validate)]
pub struct PujaForm {
    #[garde(length(min = 1, max = 200))]
    pub puja_name: String,
    #[garde(length(min = 1, max = 100))]
    pub category_id: String,
    #[garde(custom(non_negative_number))]
    pub price: String,
    #[garde(skip)]
    pub admin_commission: Option<String>,
    #[garde(skip)]
    pub overview: Option<String>,
    #[garde(skip)]
    pub why_perform: Option<String>,
    #[garde(skip)]
    pub puja_details: Option<String>,
    #[garde(skip)]
    pub duration: Option<String>,
    #[garde(skip)]
    pub benefits: Option<String>,
    #[garde(skip)]
    pub who_should_book: Option<String>,
    #[garde(skip)]
    pub why_you_should: Option<String>,
    #[garde(skip)]
    pub pricing_packages: Option<String>,
    #[garde(skip)]
    pub testimonials: Option<String>,
    #[garde(skip)]
    pub faqs: Option<String>,
}

fn non_negative_number(value: &str, _context: &()) -> garde::Result {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed >= 0.0 => Ok(()),
        _ => Err(garde::Error::new("must be a non-negative number")),
    }
}
