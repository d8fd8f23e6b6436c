//! Cloudinary image deletion
//!
//! Best-effort remote cleanup for gallery images hosted on Cloudinary.
//! Deletion failures are reported as an outcome, never as an error, so
//! callers can remove the database row regardless.

use serde_json::Value;

use crate::config::{CloudinaryConfig, CloudinaryCredentials};

/// What happened to the remote asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Cloudinary confirmed the asset was removed.
    Deleted,
    /// Cloudinary has no asset under that public id.
    NotFound,
    /// The deletion could not be performed or confirmed.
    Failed(String),
}

/// Extract the Cloudinary public id from a delivery URL.
///
/// Delivery URLs look like
/// `https://res.cloudinary.com/{cloud}/image/upload/v123/folder/name.jpg`.
/// The public id is everything after the `upload` segment, minus the
/// optional version segment and the file extension.
pub fn extract_public_id(url: &str) -> Option<String> {
    let parts: Vec<&str> = url.split('/').collect();
    let upload_idx = parts.iter().position(|p| *p == "upload")?;

    let mut rest: &[&str] = parts.get(upload_idx + 1..)?;
    if rest.is_empty() {
        return None;
    }

    // Skip the version segment (v followed by digits) when present.
    if let Some(first) = rest.first() {
        if first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit())
        {
            rest = &rest[1..];
        }
    }
    if rest.is_empty() {
        return None;
    }

    let joined = rest.join("/");
    let public_id = match joined.rfind('.') {
        Some(dot) if dot > joined.rfind('/').map_or(0, |s| s + 1) => &joined[..dot],
        _ => &joined,
    };

    if public_id.is_empty() {
        None
    } else {
        Some(public_id.to_string())
    }
}

#[derive(Clone)]
pub struct CloudinaryClient {
    credentials: Option<CloudinaryCredentials>,
    http: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            credentials: config.credentials(),
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Delete the asset behind a delivery URL via the Admin API.
    ///
    /// Never returns an error: anything that prevents a confirmed
    /// deletion comes back as `DeleteOutcome::Failed`.
    pub async fn delete_image(&self, image_url: &str) -> DeleteOutcome {
        let Some(credentials) = &self.credentials else {
            return DeleteOutcome::Failed("Cloudinary credentials not configured".to_string());
        };

        let Some(public_id) = extract_public_id(image_url) else {
            return DeleteOutcome::Failed(format!(
                "Could not extract public id from URL: {}",
                image_url
            ));
        };

        let endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload",
            credentials.cloud_name
        );

        let response = match self
            .http
            .delete(&endpoint)
            .basic_auth(&credentials.api_key, Some(&credentials.api_secret))
            .query(&[("public_ids[]", public_id.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return DeleteOutcome::Failed(format!("Cloudinary request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return DeleteOutcome::Failed(format!("Cloudinary returned status {}", status));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return DeleteOutcome::Failed(format!("Invalid Cloudinary response: {}", e)),
        };

        match body.get("deleted").and_then(|d| d.get(&public_id)).and_then(Value::as_str) {
            Some("deleted") => DeleteOutcome::Deleted,
            Some("not_found") => DeleteOutcome::NotFound,
            Some(other) => DeleteOutcome::Failed(format!(
                "Unexpected deletion state for {}: {}",
                public_id, other
            )),
            None => DeleteOutcome::Failed(format!(
                "Cloudinary response missing result for {}",
                public_id
            )),
        }
    }
}
