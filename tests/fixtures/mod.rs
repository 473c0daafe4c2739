//! Canned platform-backend payloads, in the backend's own dialect.
#![allow(dead_code)] // shared between test binaries; not all use everything

use serde_json::{json, Value};

/// Smallest valid 1x1 PNG, for multipart image uploads.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// An order row.
pub fn order(id: &str, status: Option<&str>, created_at: &str) -> Value {
    let mut row = json!({
        "_id": id,
        "name": format!("Customer {id}"),
        "email": format!("{id}@example.com"),
        "planName": "life changing",
        "createdAt": created_at,
    });
    if let Some(status) = status {
        row["reportDeliveryStatus"] = json!(status);
    }
    row
}

/// Timestamp at minute `i` of a fixed day, so relative age is obvious.
pub fn minute(i: u32) -> String {
    format!("2026-01-05T10:{i:02}:00Z")
}

/// An order page in the newer, bare shape.
pub fn orders_page(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "page": 1,
        "limit": total,
        "total": total,
        "pages": 1,
        "items": items,
    })
}

/// The same page wrapped in `{ "data": … }`, the older shape.
pub fn wrapped_orders_page(items: Vec<Value>) -> Value {
    json!({ "data": orders_page(items) })
}

/// Fifteen orders ascending by creation time: ten pending with five
/// delivered rows interleaved. The oldest five pending ids are
/// o01, o02, o04, o06, o07.
pub fn interleaved_orders() -> Vec<Value> {
    let delivered = [3, 5, 8, 10, 13];
    (1..=15)
        .map(|i| {
            let status = if delivered.contains(&i) { "delivered" } else { "pending" };
            order(&format!("o{i:02}"), Some(status), &minute(i))
        })
        .collect()
}

pub fn leads_payload() -> Value {
    json!({
        "data": [
            {
                "_id": "lead-1",
                "name": "Ramesh Kumar",
                "email": "ramesh@example.com",
                "phone": "+91 98765 43210",
                "message": "Interested in a certified stone",
                "productName": "Blue Sapphire",
                "productType": "gemstone",
                "createdAt": "2026-02-01T09:00:00Z",
            },
            {
                "_id": "lead-2",
                "name": "Asha Devi",
                "email": "asha@example.com",
                "productName": "5 Mukhi Rudraksha",
                "productType": "rudraksha",
                "createdAt": "2026-02-03T09:00:00Z",
            },
        ]
    })
}

/// Earnings history exercising the party unions: an embedded astrologer, a
/// bare-string customer id, a live-session row, and a null astrologer.
pub fn earnings_payload() -> Value {
    json!({
        "history": [
            {
                "_id": "earn-1",
                "type": "video_call",
                "astrologerId": {
                    "_id": "astro-1",
                    "astrologerName": "Pandit Suresh",
                    "isLive": false,
                },
                "customerId": "cust-1",
                "transactionId": "TXN-1001",
                "totalPrice": 500.0,
                "adminPrice": 150.0,
                "partnerPrice": 350.0,
                "duration": 25,
                "createdAt": "2026-02-01T10:00:00Z",
            },
            {
                "_id": "earn-2",
                "type": "live_video_call",
                "astrologerId": {
                    "_id": "astro-2",
                    "astrologerName": "Live Host",
                    "isLive": true,
                },
                "totalPrice": 900.0,
                "createdAt": "2026-02-02T10:00:00Z",
            },
            {
                "_id": "earn-3",
                "type": "puja",
                "astrologerId": null,
                "customerId": { "_id": "cust-2", "customerName": "Asha" },
                "transactionId": "TXN-1003",
                "totalPrice": 2100.0,
                "adminPrice": 2100.0,
                "partnerPrice": 0.0,
                "earningBreakdown": {
                    "totalPaidByUser": 2100.0,
                    "gstAmount": 320.34,
                    "astrologerShareBeforeTDS": 0.0,
                },
                "createdAt": "2026-02-03T10:00:00Z",
            },
        ]
    })
}

/// A puja in the legacy field spellings, under the `{ "data": … }` envelope.
pub fn legacy_puja_payload() -> Value {
    json!({
        "data": {
            "_id": "puja-1",
            "pujaName": "Satyanarayan Puja",
            "mainImage": "uploads/satya.jpg",
            "categoryId": { "_id": "cat-1" },
            "price": "2100",
            "benefits": "peace,harmony,prosperity",
            "whoShouldBook": ["families", "newlyweds"],
            "galleryImages": ["uploads/g1.jpg"],
        }
    })
}

pub fn categories_payload() -> Value {
    json!({
        "results": [
            { "_id": "cat-1", "categoryName": "Festival" },
            { "_id": "cat-2", "categoryName": "Remedial" },
        ]
    })
}
