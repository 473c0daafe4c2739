//! CSV Exports
//!
//! Table exports for the leads and earnings screens. Dates render as
//! DD/MM/YYYY to match the dashboard tables; breakdown columns fall back to
//! zero for rows that predate the breakdown field.

use chrono::{DateTime, Utc};

use crate::models::earning::Earning;
use crate::models::lead::Lead;

fn date_cell(stamp: Option<DateTime<Utc>>) -> String {
    stamp.map(|dt| dt.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

fn text_cell(field: Option<&str>) -> String {
    field.unwrap_or("").to_string()
}

fn money_cell(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Render the leads table as CSV.
pub fn leads_csv(leads: &[Lead]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "S.No.",
        "Name",
        "Email",
        "Phone",
        "Message",
        "Product Name",
        "Product Type",
        "Created Date",
    ])?;

    for (index, lead) in leads.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            text_cell(lead.name.as_deref()),
            text_cell(lead.email.as_deref()),
            text_cell(lead.phone.as_deref()),
            text_cell(lead.message.as_deref()),
            text_cell(lead.product_name.as_deref()),
            text_cell(lead.product_type.as_deref()),
            date_cell(lead.created_at),
        ])?;
    }

    finish(writer)
}

/// Render the earnings table as CSV, breakdown columns included.
pub fn earnings_csv(earnings: &[Earning]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "S.No.",
        "Date",
        "Type",
        "Astrologer Name",
        "Astrologer Email",
        "Customer Name",
        "Customer Email",
        "Transaction ID",
        "Total Paid",
        "GST Amount",
        "Net Amount",
        "Astrologer Share (pre-TDS)",
        "TDS Amount",
        "Payable to Astrologer",
        "Admin Share",
    ])?;

    for (index, earning) in earnings.iter().enumerate() {
        let breakdown = earning.breakdown.clone().unwrap_or_default();
        writer.write_record([
            (index + 1).to_string(),
            date_cell(earning.created_at),
            earning.kind.to_string(),
            text_cell(earning.astrologer.name.as_deref()),
            text_cell(earning.astrologer.email.as_deref()),
            text_cell(earning.customer.name.as_deref()),
            text_cell(earning.customer.email.as_deref()),
            text_cell(earning.transaction_id.as_deref()),
            money_cell(earning.total_price),
            money_cell(breakdown.gst_amount),
            money_cell(breakdown.net_amount),
            money_cell(breakdown.astrologer_share_before_tds),
            money_cell(breakdown.tds_amount),
            money_cell(breakdown.payable_to_astrologer),
            money_cell(breakdown.admin_share),
        ])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("CSV produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
