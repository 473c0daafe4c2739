//! Puja catalog passthrough.
//!
//! Reads normalize the backend's historical field variants into one
//! canonical listing; writes accept the dashboard's multipart form, validate
//! it locally (required scalars, image bytes sniffed by content), and
//! forward it to the backend untouched beyond that.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use garde::Validate;
use image::ImageFormat;

use crate::app_state::AppState;
use crate::models::puja::{Category, Puja, PujaForm};
use crate::routes::ApiError;
use crate::services::backend::BackendError;
use crate::services::session::Session;

/// GET /api/pujas/{id}
pub async fn get_puja(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Puja>, ApiError> {
    let raw = state.backend.fetch_puja(&session.token, &id).await?;
    Ok(Json(raw.normalize(state.settings.image_base_url.as_deref())))
}

/// GET /api/pujas/categories
pub async fn list_categories(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.backend.fetch_puja_categories(&session.token).await?;
    Ok(Json(categories))
}

/// POST /api/pujas
pub async fn create_puja(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let submission = read_submission(multipart).await?;
    submission
        .form
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let form = forward_form(submission)?;
    let reply = state.backend.create_puja(&session.token, form).await?;
    Ok(Json(reply))
}

/// PUT /api/pujas/{id}
pub async fn update_puja(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let submission = read_submission(multipart).await?;
    submission
        .form
        .validate()
        .map_err(|report| ApiError::Validation(report.to_string()))?;

    let form = forward_form(submission)?;
    let reply = state.backend.update_puja(&session.token, &id, form).await?;
    Ok(Json(reply))
}

/// An image payload that passed content inspection.
struct ImagePart {
    bytes: Vec<u8>,
    file_name: String,
    mime: &'static str,
}

/// Sniff the actual bytes; the client-supplied content type is not trusted.
fn sniff_image(bytes: &[u8]) -> Result<&'static str, ApiError> {
    let format = image::guess_format(bytes).map_err(|_| ApiError::UnsupportedImage)?;
    match format {
        ImageFormat::Jpeg => Ok("image/jpeg"),
        ImageFormat::Png => Ok("image/png"),
        ImageFormat::WebP => Ok("image/webp"),
        _ => Err(ApiError::UnsupportedImage),
    }
}

#[derive(Default)]
struct PujaSubmission {
    form: PujaForm,
    image: Option<ImagePart>,
    gallery: Vec<ImagePart>,
}

impl PujaSubmission {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "pujaName" => self.form.puja_name = value,
            "categoryId" => self.form.category_id = value,
            "price" => self.form.price = value,
            "adminCommission" => self.form.admin_commission = Some(value),
            "overview" => self.form.overview = Some(value),
            "whyPerform" => self.form.why_perform = Some(value),
            "pujaDetails" => self.form.puja_details = Some(value),
            "duration" => self.form.duration = Some(value),
            "benefits" => self.form.benefits = Some(value),
            "whoShouldBook" => self.form.who_should_book = Some(value),
            "whyYouShould" => self.form.why_you_should = Some(value),
            "pricingPackages" => self.form.pricing_packages = Some(value),
            "testimonials" => self.form.testimonials = Some(value),
            "faqs" => self.form.faqs = Some(value),
            // Unknown fields are dropped, not forwarded blindly.
            _ => {}
        }
    }
}

async fn read_submission(mut multipart: Multipart) -> Result<PujaSubmission, ApiError> {
    let mut submission = PujaSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Validation(format!("malformed form: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::Validation(format!("unreadable image: {err}")))?;
                // An empty slot means "keep the existing image" on updates.
                if bytes.is_empty() {
                    continue;
                }
                let mime = sniff_image(&bytes)?;
                submission.image = Some(ImagePart { bytes: bytes.to_vec(), file_name, mime });
            }
            "galleryImages" => {
                let file_name = field.file_name().unwrap_or("gallery").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::Validation(format!("unreadable image: {err}")))?;
                if bytes.is_empty() {
                    continue;
                }
                let mime = sniff_image(&bytes)?;
                submission.gallery.push(ImagePart { bytes: bytes.to_vec(), file_name, mime });
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ApiError::Validation(format!("unreadable field: {err}")))?;
                submission.set_text(&name, value);
            }
        }
    }

    Ok(submission)
}

/// Rebuild the multipart body for the backend: scalar fields as text, list
/// fields as the JSON-encoded strings the dashboard already sends, image
/// parts with their sniffed content type.
fn forward_form(submission: PujaSubmission) -> Result<reqwest::multipart::Form, BackendError> {
    let PujaSubmission { form: fields, image, gallery } = submission;

    let mut form = reqwest::multipart::Form::new()
        .text("pujaName", fields.puja_name)
        .text("categoryId", fields.category_id)
        .text("price", fields.price);

    let optional = [
        ("adminCommission", fields.admin_commission),
        ("overview", fields.overview),
        ("whyPerform", fields.why_perform),
        ("pujaDetails", fields.puja_details),
        ("duration", fields.duration),
        ("benefits", fields.benefits),
        ("whoShouldBook", fields.who_should_book),
        ("whyYouShould", fields.why_you_should),
        ("pricingPackages", fields.pricing_packages),
        ("testimonials", fields.testimonials),
        ("faqs", fields.faqs),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            form = form.text(key, value);
        }
    }

    if let Some(image) = image {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        form = form.part("image", part);
    }
    for shot in gallery {
        let part = reqwest::multipart::Part::bytes(shot.bytes)
            .file_name(shot.file_name)
            .mime_str(shot.mime)?;
        form = form.part("galleryImages", part);
    }

    Ok(form)
}
