use std::path::{Path, PathBuf};

use serde::Serialize;

use super::asset::asset_filename;
use super::markup::extract_asset_urls;
use super::types::{ContentItem, Lesson};
use super::{SkilljarClient, SkilljarError};

/// Keeps alphanumerics, space, hyphen and underscore, then trims trailing
/// whitespace.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `<sanitized-title>_<lesson-id>`. The id is kept as is apart from path
/// separators, which would nest the directory.
pub fn lesson_dir_name(lesson: &Lesson) -> String {
    let id: String = lesson.id.chars().filter(|c| !matches!(c, '/' | '\\')).collect();
    format!("{}_{}", sanitize_title(&lesson.display_title()), id)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LessonReport {
    pub content_files: usize,
    pub assets_downloaded: usize,
    pub assets_failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub courses_completed: usize,
    pub courses_failed: usize,
    pub lessons: usize,
    pub assets_downloaded: usize,
    pub assets_failed: usize,
}

impl RunSummary {
    fn add_lesson(&mut self, report: LessonReport) {
        self.lessons += 1;
        self.assets_downloaded += report.content_files + report.assets_downloaded;
        self.assets_failed += report.assets_failed;
    }
}

/// Per-lesson download state. The asset counter spans every content item of
/// the lesson so markup assets never overwrite each other.
struct LessonContext {
    dir: PathBuf,
    asset_counter: usize,
    report: LessonReport,
}

impl LessonContext {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            asset_counter: 0,
            report: LessonReport::default(),
        }
    }

    fn next_asset_name(&mut self, url: &str) -> String {
        let name = asset_filename(self.asset_counter, url);
        self.asset_counter += 1;
        name
    }

    fn record(&mut self, written: Option<PathBuf>, direct: bool) {
        match (written, direct) {
            (Some(_), true) => self.report.content_files += 1,
            (Some(_), false) => self.report.assets_downloaded += 1,
            (None, _) => self.report.assets_failed += 1,
        }
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SkilljarError> {
    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');
    tokio::fs::write(path, body).await?;
    Ok(())
}

impl SkilljarClient {
    /// Materializes one lesson below `course_dir`: metadata, content items,
    /// direct content files and every asset embedded in content markup.
    pub async fn download_lesson(
        &self,
        lesson: &Lesson,
        course_dir: &Path,
    ) -> Result<LessonReport, SkilljarError> {
        let dir = course_dir.join(lesson_dir_name(lesson));
        tokio::fs::create_dir_all(&dir).await?;

        tracing::info!(lesson_id = %lesson.id, title = %lesson.display_title(), "downloading lesson");

        let details = self.get_lesson_details(&lesson.id).await?;
        write_json(&dir.join("lesson_metadata.json"), &details).await?;

        let content_items = self.get_lesson_content(&lesson.id).await;
        if !content_items.is_empty() {
            write_json(&dir.join("content_items.json"), &content_items).await?;
        }

        let items: Vec<ContentItem> = content_items.iter().map(ContentItem::from_value).collect();
        let mut ctx = LessonContext::new(dir);

        for (i, item) in items.iter().enumerate() {
            if let Some(url) = item.direct_url() {
                let written = self
                    .fetch_asset(url, &ctx.dir, &format!("content_{}", i), true)
                    .await;
                ctx.record(written, true);
            }
        }

        for item in &items {
            let Some(html) = item.html() else {
                continue;
            };
            for url in extract_asset_urls(html) {
                let name = ctx.next_asset_name(&url);
                let written = self.fetch_asset(&url, &ctx.dir, &name, false).await;
                ctx.record(written, false);
            }
        }

        tokio::time::sleep(self.lesson_delay).await;
        Ok(ctx.report)
    }

    async fn download_course(
        &self,
        course_id: &str,
        output_dir: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), SkilljarError> {
        let course_dir = output_dir.join(format!("course_{}", course_id));
        tokio::fs::create_dir_all(&course_dir).await?;

        let lessons = self.get_course_lessons(course_id).await?;
        if lessons.is_empty() {
            tracing::info!(course_id, "no lessons found");
            return Ok(());
        }

        tracing::info!(course_id, count = lessons.len(), "found lessons");
        for lesson in &lessons {
            let report = self.download_lesson(lesson, &course_dir).await?;
            summary.add_lesson(report);
        }

        Ok(())
    }

    /// Downloads every course in order. A failing course is logged and the
    /// next one proceeds; only an unusable output directory ends the run.
    pub async fn download_courses(
        &self,
        course_ids: &[String],
        output_dir: &Path,
    ) -> Result<RunSummary, SkilljarError> {
        tokio::fs::create_dir_all(output_dir).await?;

        let mut summary = RunSummary::default();
        for course_id in course_ids {
            tracing::info!(course_id = %course_id, "processing course");

            match self.download_course(course_id, output_dir, &mut summary).await {
                Ok(()) => {
                    tracing::info!(course_id = %course_id, "completed course");
                    summary.courses_completed += 1;
                }
                Err(e) => {
                    tracing::error!(course_id = %course_id, error = %e, "error processing course");
                    summary.courses_failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
