//! The call boundary between the pipeline and the scoring workflows.

use anyhow::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AdapterError;
use crate::scorer::{Scorer, Task1Input, Task2Input};

/// Turns user-facing arguments into scorer inputs and scorer reports into text.
pub struct Adapter {
    task1: Arc<dyn Scorer<Task1Input>>,
    task2: Arc<dyn Scorer<Task2Input>>,
}

impl Adapter {
    pub fn new(task1: Arc<dyn Scorer<Task1Input>>, task2: Arc<dyn Scorer<Task2Input>>) -> Self {
        Self { task1, task2 }
    }

    /// Score a Task 1 response. Fails with [`AdapterError::ImageNotFound`]
    /// before contacting the scorer when `image` is not a readable file.
    pub async fn task1(&self, image: &Path, essay: &str) -> Result<String> {
        let is_file = tokio::fs::metadata(image)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(AdapterError::image_not_found(image).into());
        }

        let image_data_url = encode_image(image).await?;
        info!(bytes = image_data_url.len(), "running Task 1 scorer");

        let input = Task1Input {
            image_data_url,
            essay: essay.to_string(),
        };
        let report = self.task1.score(&input).await?;
        Ok(report.to_string())
    }

    /// Score a Task 2 essay against its question.
    pub async fn task2(&self, question: &str, essay: &str) -> Result<String> {
        info!("running Task 2 scorer");
        let input = Task2Input {
            question: question.to_string(),
            essay: essay.to_string(),
        };
        let report = self.task2.score(&input).await?;
        Ok(report.to_string())
    }
}

/// Read an image and embed it as a base64 `data:` URL.
pub async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| AdapterError::image_not_found(path))?;
    let mime = mime_for(path);
    debug!(mime, size = bytes.len(), "encoding image");
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Guess the image MIME type from the extension. Unknown types are sent as
/// JPEG, which vision endpoints sniff anyway.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("chart.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("chart.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("chart.gif")), "image/gif");
        assert_eq!(mime_for(Path::new("chart.jpg")), "image/jpeg");
        assert_eq!(mime_for(&PathBuf::from("chart")), "image/jpeg");
    }

    #[tokio::test]
    async fn encode_image_builds_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        std::fs::write(&path, b"hello").unwrap();

        let url = encode_image(&path).await.unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
    }
}
