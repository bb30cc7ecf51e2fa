// ABOUTME: Blocking Imgur client used to rehost local images
// ABOUTME: Uploads a file anonymously and returns its public link

use crate::api::{send_json, HTTP_TIMEOUT};
use crate::error::RemoteError;
use reqwest::blocking::{multipart::Form, Client};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_IMAGE_HOST_BASE: &str = "https://api.imgur.com";

/// Somewhere local images can be uploaded to.
pub trait ImageHost {
    fn upload(&self, path: &Path) -> Result<String, RemoteError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    link: String,
}

pub struct ImgurClient {
    client: Client,
    base_url: String,
    client_id: String,
}

impl ImgurClient {
    pub fn new(client_id: String, base_url: Option<String>) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(ImgurClient {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_IMAGE_HOST_BASE.into())
                .trim_end_matches('/')
                .to_string(),
            client_id,
        })
    }
}

impl ImageHost for ImgurClient {
    fn upload(&self, path: &Path) -> Result<String, RemoteError> {
        let form = Form::new().file("image", path).map_err(|e| {
            RemoteError::BadRequest(format!("could not read image {}: {}", path.display(), e))
        })?;

        let request = self
            .client
            .post(format!("{}/3/upload", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form);

        let response: UploadResponse = send_json(request)?;
        Ok(response.data.link)
    }
}
