use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// Report delivery state of an order, as tracked by the backend.
///
/// The backend has emitted free-form values over time; anything it sends
/// that is not a known state is preserved in `Other` so it can be displayed,
/// but only `Pending`/`Failed` (or no status at all) qualify an order for
/// report processing.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
    #[strum(default)]
    Other(String),
}

impl DeliveryStatus {
    /// Parse a raw status field. Empty or whitespace-only becomes `None`.
    pub fn from_raw(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            return None;
        }
        // EnumString with a default variant cannot fail.
        trimmed.parse().ok()
    }
}

impl Serialize for DeliveryStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A customer order exactly as the backend returns it.
///
/// Field names vary across backend versions (`_id` vs `id`, `orderID` vs
/// `orderId`), so known spellings are aliased and unrecognized fields are
/// carried through untouched in `extra`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "orderID")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub report_language: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub report_delivery_status: Option<String>,
    #[serde(default)]
    pub drive_file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawOrder {
    /// Produce the canonical record the rest of the dashboard works with.
    pub fn normalize(self) -> Order {
        Order {
            id: self.id.map(|s| s.trim().to_string()).unwrap_or_default(),
            order_id: self.order_id,
            name: self.name,
            email: self.email,
            whatsapp: self.whatsapp,
            report_language: self.report_language,
            plan_name: self.plan_name,
            amount: self.amount.as_ref().and_then(super::scalar_to_string),
            status: self.status,
            delivery_status: DeliveryStatus::from_raw(self.report_delivery_status.as_deref()),
            drive_file_url: self.drive_file_url,
            created_at: super::parse_timestamp(self.created_at.as_deref()),
            extra: self.extra,
        }
    }
}

/// Canonical order record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Backend identifier; may be empty for malformed rows, which are then
    /// excluded from batch extraction but still shown in tables.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Order {
    /// Whether this order still needs report processing.
    ///
    /// Pending, failed, and status-less orders qualify. Delivered orders and
    /// anything carrying an unrecognized status do not.
    pub fn needs_report(&self) -> bool {
        matches!(
            self.delivery_status,
            None | Some(DeliveryStatus::Pending) | Some(DeliveryStatus::Failed)
        )
    }
}

/// One page of orders as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OrdersPage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
    pub items: Vec<Order>,
}

/// Raw page payload; older backend deployments wrap it in `{ "data": … }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawOrdersEnvelope {
    Wrapped { data: RawOrdersPage },
    Bare(RawOrdersPage),
}

impl RawOrdersEnvelope {
    pub fn normalize(self) -> OrdersPage {
        let raw = match self {
            RawOrdersEnvelope::Wrapped { data } => data,
            RawOrdersEnvelope::Bare(page) => page,
        };
        OrdersPage {
            page: raw.page,
            limit: raw.limit,
            total: raw.total,
            pages: raw.pages,
            items: raw.items.into_iter().map(RawOrder::normalize).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawOrdersPage {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub pages: u32,
    #[serde(default)]
    pub items: Vec<RawOrder>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    100
}

/// Query parameters understood by the backend's order search.
#[derive(Debug, Clone)]
pub struct OrderQuery {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub plan_name: Option<String>,
    pub language: Option<String>,
    pub delivery_status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            q: None,
            from: None,
            to: None,
            status: None,
            plan_name: None,
            language: None,
            delivery_status: None,
            sort_by: None,
            sort_order: None,
            page: 1,
            limit: default_limit(),
        }
    }
}

impl OrderQuery {
    /// Render the non-empty parameters in the backend's query dialect.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let text = [
            ("q", &self.q),
            ("from", &self.from),
            ("to", &self.to),
            ("status", &self.status),
            ("planName", &self.plan_name),
            ("language", &self.language),
            ("reportDeliveryStatus", &self.delivery_status),
            ("sortBy", &self.sort_by),
            ("sortOrder", &self.sort_order),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref() {
                let v = v.trim();
                if !v.is_empty() {
                    params.push((key, v.to_string()));
                }
            }
        }
        params
    }
}
