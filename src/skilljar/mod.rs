mod asset;
mod lesson;
mod markup;
mod types;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::config::Config;

pub use lesson::RunSummary;
use types::Lesson;

pub struct SkilljarClient {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    page_delay: Duration,
    lesson_delay: Duration,
}

#[derive(thiserror::Error)]
pub enum SkilljarError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not fetch lessons for course {course_id}: {source}")]
    CourseLessons {
        course_id: String,
        #[source]
        source: Box<SkilljarError>,
    },
    #[error("invalid endpoint {0}: {1}")]
    Endpoint(String, url::ParseError),
    #[error("could not build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl std::fmt::Debug for SkilljarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl SkilljarClient {
    pub fn new(config: &Config) -> Result<Self, SkilljarError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("skilljar-downloader/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(SkilljarError::Client)?;

        if config.insecure {
            tracing::warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            page_delay: config.page_delay,
            lesson_delay: config.lesson_delay,
        })
    }

    /// Authenticated GET against the API, decoded as JSON.
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, SkilljarError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| SkilljarError::Endpoint(endpoint.to_string(), e))?;

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.api_key, Some(""))
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SkilljarError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Walks `page=1,2,...` until a page has no `next` pointer or comes back
    /// empty, keeping items in page order.
    async fn get_paginated(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, SkilljarError> {
        let mut all_results = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut current_params = params.to_vec();
            current_params.push(("page", page.to_string()));

            let data = self.get_json(endpoint, &current_params).await?;
            let (results, has_next) = split_page(data);
            let empty = results.is_empty();
            all_results.extend(results);

            if !has_next || empty {
                break;
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        Ok(all_results)
    }

    pub async fn get_course_lessons(&self, course_id: &str) -> Result<Vec<Lesson>, SkilljarError> {
        tracing::info!(course_id, "fetching lessons");

        self.get_paginated("/v1/lessons", &[("course_id", course_id.to_string())])
            .await
            .and_then(|items| {
                items
                    .into_iter()
                    .map(|item| serde_json::from_value::<Lesson>(item).map_err(SkilljarError::from))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|source| SkilljarError::CourseLessons {
                course_id: course_id.to_string(),
                source: Box::new(source),
            })
    }

    pub async fn get_lesson_details(&self, lesson_id: &str) -> Result<Value, SkilljarError> {
        self.get_json(&format!("/v1/lessons/{}", lesson_id), &[]).await
    }

    /// Content items of a lesson. A failed fetch is logged and treated as a
    /// lesson without content.
    pub async fn get_lesson_content(&self, lesson_id: &str) -> Vec<Value> {
        let endpoint = format!("/v1/lessons/{}/content-items", lesson_id);
        match self.get_paginated(&endpoint, &[]).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(lesson_id, error = %e, "could not fetch content items");
                Vec::new()
            }
        }
    }
}

/// Splits one page into its items and whether another page follows.
///
/// Accepts `{"results": [...], "next": ...}`, a bare array (always the last
/// page), or any other value (a single item, last page).
fn split_page(data: Value) -> (Vec<Value>, bool) {
    match data {
        Value::Object(mut map) if map.contains_key("results") => {
            let has_next = map.get("next").is_some_and(|next| !next.is_null());
            let results = match map.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            (results, has_next)
        }
        Value::Array(items) => (items, false),
        other => (vec![other], false),
    }
}
