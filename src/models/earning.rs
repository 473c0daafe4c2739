use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// Revenue stream an earning row belongs to.
///
/// Display strings are the labels the dashboard shows; `FromStr` accepts the
/// backend's snake_case values case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum EarningKind {
    #[strum(serialize = "consultation", to_string = "Consultation")]
    Consultation,
    #[strum(serialize = "puja", to_string = "Puja")]
    Puja,
    #[strum(serialize = "chat", to_string = "Chat")]
    Chat,
    #[strum(serialize = "call", to_string = "Call")]
    Call,
    #[strum(serialize = "video_call", to_string = "Video Call")]
    VideoCall,
    #[strum(serialize = "live_video_call", to_string = "Live Call")]
    LiveVideoCall,
    #[strum(default)]
    Other(String),
}

impl EarningKind {
    pub fn from_raw(raw: Option<&str>) -> Self {
        // EnumString with a default variant cannot fail.
        raw.unwrap_or_default()
            .trim()
            .parse()
            .unwrap_or_else(|_| EarningKind::Other(String::new()))
    }
}

impl Serialize for EarningKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A participant reference as the backend has variously stored it:
/// a bare id string, `null`, or an embedded record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPartyRef {
    Id(String),
    Embedded(RawParty),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParty {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "astrologerName", alias = "customerName")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_live: Option<bool>,
}

/// Canonical participant shape after normalizing the union above.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_live: bool,
}

impl RawPartyRef {
    pub fn normalize(self) -> Party {
        match self {
            RawPartyRef::Id(id) => Party { id: Some(id), ..Party::default() },
            RawPartyRef::Embedded(raw) => Party {
                id: raw.id,
                name: raw.name,
                email: raw.email,
                is_live: raw.is_live.unwrap_or(false),
            },
        }
    }
}

/// Fee split recorded with newer earnings rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarningBreakdown {
    pub total_paid_by_user: f64,
    pub gst_amount: f64,
    pub net_amount: f64,
    #[serde(alias = "astrologerShareBeforeTDS")]
    pub astrologer_share_before_tds: f64,
    pub tds_amount: f64,
    pub payable_to_astrologer: f64,
    pub admin_share: f64,
    pub astrologer_earning_percentage: f64,
    pub tds_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEarning {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub astrologer_id: Option<RawPartyRef>,
    #[serde(default)]
    pub customer_id: Option<RawPartyRef>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub admin_price: Option<f64>,
    #[serde(default)]
    pub partner_price: Option<f64>,
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
    #[serde(default)]
    pub earning_breakdown: Option<EarningBreakdown>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Canonical earning row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    pub id: String,
    pub kind: EarningKind,
    pub astrologer: Party,
    pub customer: Party,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub total_price: f64,
    pub admin_price: f64,
    pub partner_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<EarningBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawEarning {
    pub fn normalize(self) -> Earning {
        Earning {
            id: self.id.unwrap_or_default(),
            kind: EarningKind::from_raw(self.kind.as_deref()),
            astrologer: self.astrologer_id.map(RawPartyRef::normalize).unwrap_or_default(),
            customer: self.customer_id.map(RawPartyRef::normalize).unwrap_or_default(),
            transaction_id: self.transaction_id,
            total_price: self.total_price.unwrap_or(0.0),
            admin_price: self.admin_price.unwrap_or(0.0),
            partner_price: self.partner_price.unwrap_or(0.0),
            duration: self.duration.as_ref().and_then(super::scalar_to_string),
            breakdown: self.earning_breakdown,
            created_at: super::parse_timestamp(self.created_at.as_deref()),
        }
    }
}

impl Earning {
    /// Case-insensitive substring match across the fields the table shows.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let kind_label = self.kind.to_string();
        let matched = [
            self.astrologer.name.as_deref(),
            self.astrologer.email.as_deref(),
            self.customer.name.as_deref(),
            self.customer.email.as_deref(),
            self.transaction_id.as_deref(),
            Some(kind_label.as_str()),
            Some(self.id.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle));
        matched
    }
}

#[derive(Debug, Deserialize)]
pub struct RawEarningsEnvelope {
    #[serde(default)]
    pub history: Vec<RawEarning>,
}

impl RawEarningsEnvelope {
    /// Normalize, drop rows attributed to a live astrologer session, and
    /// sort newest-first.
    pub fn normalize(self) -> Vec<Earning> {
        let mut earnings: Vec<Earning> = self
            .history
            .into_iter()
            .map(RawEarning::normalize)
            .filter(|earning| !earning.astrologer.is_live)
            .collect();
        earnings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        earnings
    }
}
