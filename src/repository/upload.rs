use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};

use crate::domain::types::WebUrl;
use crate::models::registration::ApiUpload;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ApiRepository, ImageUpload, UploadWriter};

#[async_trait]
impl UploadWriter for ApiRepository {
    async fn upload_image(&self, upload: ImageUpload) -> RepositoryResult<WebUrl> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)?;
        let request = self
            .request(Method::POST, &["uploads", "image"])?
            .multipart(Form::new().part("image", part));

        let uploaded: ApiUpload = self.send_json(request).await?;
        WebUrl::new(uploaded.url)
            .map_err(|e| RepositoryError::Decode(format!("upload returned an invalid url: {e}")))
    }
}
