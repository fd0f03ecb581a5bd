use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use url::Url;

use super::{SkilljarClient, SkilljarError};

impl SkilljarClient {
    /// Downloads one resource and reports the written path. Failures are
    /// logged with the URL and swallowed; `None` means the asset was skipped.
    pub async fn fetch_asset(
        &self,
        url: &str,
        dir: &Path,
        filename_prefix: &str,
        infer_extension: bool,
    ) -> Option<PathBuf> {
        match self
            .download_file(url, dir, filename_prefix, infer_extension)
            .await
        {
            Ok(path) => {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                tracing::info!(file = %name, "downloaded");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to download asset");
                None
            }
        }
    }

    /// Streams `url` into `dir`. With `infer_extension` the prefix gets an
    /// extension guessed from the URL or the content type, otherwise the
    /// prefix is the whole filename.
    pub async fn download_file(
        &self,
        url: &str,
        dir: &Path,
        filename_prefix: &str,
        infer_extension: bool,
    ) -> Result<PathBuf, SkilljarError> {
        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SkilljarError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let filename = if infer_extension {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            format!("{}{}", filename_prefix, guess_extension(url, content_type))
        } else {
            filename_prefix.to_string()
        };

        let path = dir.join(filename);
        if let Err(e) = write_body(&mut response, &path).await {
            // a partial body must not survive under the final name
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        Ok(path)
    }
}

async fn write_body(response: &mut reqwest::Response, path: &Path) -> Result<(), SkilljarError> {
    let mut file = tokio::fs::File::create(path).await?;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Extension (with the leading dot) for a direct content download, or an
/// empty string when nothing can be inferred.
pub fn guess_extension(url: &str, content_type: Option<&str>) -> String {
    if let Some(extension) = last_segment(url).and_then(|segment| {
        segment
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_string())
    }) {
        return format!(".{}", extension);
    }

    let Some(content_type) = content_type else {
        return String::new();
    };
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("video") {
        ".mp4".to_string()
    } else if content_type.contains("pdf") {
        ".pdf".to_string()
    } else if content_type.contains("image") {
        ".jpg".to_string()
    } else {
        String::new()
    }
}

/// Filename for the `counter`-th markup asset of a lesson.
pub fn asset_filename(counter: usize, url: &str) -> String {
    match last_segment(url) {
        Some(name) => format!("asset_{}_{}", counter, name),
        None => format!("asset_{}", counter),
    }
}

/// Last non-empty segment of the URL path, query and fragment excluded.
fn last_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
