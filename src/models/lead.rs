use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer enquiry (gemstone/product lead) captured by the marketing site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Case-insensitive substring match across every textual field.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.message,
            &self.product_name,
            &self.product_type,
            &self.product_details,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLead {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub product_details: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl RawLead {
    pub fn normalize(self) -> Lead {
        Lead {
            id: self.id.unwrap_or_default(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
            product_name: self.product_name,
            product_type: self.product_type,
            product_details: self.product_details,
            created_at: super::parse_timestamp(self.created_at.as_deref()),
        }
    }
}

/// Lead list payload; some deployments wrap it in `{ "data": … }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawLeadsEnvelope {
    Wrapped { data: Vec<RawLead> },
    Bare(Vec<RawLead>),
}

impl RawLeadsEnvelope {
    /// Normalize and sort newest-first, the order the dashboard tables show.
    pub fn normalize(self) -> Vec<Lead> {
        let raw = match self {
            RawLeadsEnvelope::Wrapped { data } => data,
            RawLeadsEnvelope::Bare(list) => list,
        };
        let mut leads: Vec<Lead> = raw.into_iter().map(RawLead::normalize).collect();
        // Option<DateTime> orders None first, so reversing puts undated rows last.
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        leads
    }
}
