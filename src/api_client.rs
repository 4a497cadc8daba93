use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use crate::auth::SESSION_COOKIE;

/// Thin wrapper over the course management REST surface. Every method issues
/// one request with the session cookie attached and either parses the JSON
/// body or hands back the raw response for failure-code assertions.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_cookie: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String, session_cookie: String) -> Self {
        Self {
            client,
            base_url,
            session_cookie,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.session_cookie)
    }

    async fn expect_json(response: Response, what: &str) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("{} failed: {} - Response: {}", what, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    async fn expect_no_content(response: Response, what: &str) -> Result<()> {
        if response.status() != StatusCode::NO_CONTENT {
            anyhow::bail!("{} returned {} instead of 204", what, response.status());
        }
        Ok(())
    }

    // --- root ---

    pub async fn root(&self) -> Result<Value> {
        let response = self
            .client
            .get(self.url("/"))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to reach API root")?;

        Self::expect_json(response, "Root check").await
    }

    // --- courses ---

    pub async fn list_courses(&self) -> Result<Value> {
        let response = self
            .client
            .get(self.url("/courses"))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to list courses")?;

        Self::expect_json(response, "Course listing").await
    }

    pub async fn create_course(&self, name: &str, description: &str) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/courses"))
            .header("Cookie", self.cookie_header())
            .json(&json!({
                "name": name,
                "description": description,
            }))
            .send()
            .await
            .context("Failed to create course")?;

        Self::expect_json(response, "Course creation").await
    }

    pub async fn get_course(&self, course_id: &str) -> Result<Value> {
        let response = self.get_course_raw(course_id).await?;
        Self::expect_json(response, "Course detail").await
    }

    pub async fn get_course_raw(&self, course_id: &str) -> Result<Response> {
        self.client
            .get(self.url(&format!("/courses/{}", course_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to fetch course detail")
    }

    pub async fn update_course(
        &self,
        course_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Value> {
        let response = self
            .client
            .put(self.url(&format!("/courses/{}", course_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({
                "name": name,
                "description": description,
            }))
            .send()
            .await
            .context("Failed to update course")?;

        Self::expect_json(response, "Course update").await
    }

    pub async fn delete_course(&self, course_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/courses/{}", course_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to delete course")?;

        Self::expect_no_content(response, "Course deletion").await
    }

    // --- materials ---

    pub async fn list_materials(&self, course_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(&format!("/courses/{}/materials", course_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to list materials")?;

        Self::expect_json(response, "Material listing").await
    }

    pub async fn create_url_material(
        &self,
        course_id: &str,
        name: &str,
        description: &str,
        url: &str,
    ) -> Result<Value> {
        let response = self
            .client
            .post(self.url(&format!("/courses/{}/materials", course_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({
                "type": "url",
                "name": name,
                "description": description,
                "url": url,
            }))
            .send()
            .await
            .context("Failed to create URL material")?;

        Self::expect_json(response, "URL material creation").await
    }

    pub async fn update_url_material(
        &self,
        course_id: &str,
        material_id: &str,
        name: &str,
        description: &str,
        url: &str,
    ) -> Result<Value> {
        let response = self
            .client
            .put(self.url(&format!("/courses/{}/materials/{}", course_id, material_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({
                "name": name,
                "description": description,
                "url": url,
            }))
            .send()
            .await
            .context("Failed to update URL material")?;

        Self::expect_json(response, "URL material update").await
    }

    pub async fn upload_file_material(
        &self,
        course_id: &str,
        name: &str,
        description: &str,
        filename: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<Value> {
        let response = self
            .upload_file_material_raw(course_id, name, description, filename, mime, content)
            .await?;

        Self::expect_json(response, "File material upload").await
    }

    /// Multipart upload returning the raw response so scenarios can assert
    /// on rejection codes.
    pub async fn upload_file_material_raw(
        &self,
        course_id: &str,
        name: &str,
        description: &str,
        filename: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<Response> {
        let form = Self::file_form(name, Some(description), filename, mime, content)?;

        self.client
            .post(self.url(&format!("/courses/{}/materials", course_id)))
            .header("Cookie", self.cookie_header())
            .multipart(form)
            .send()
            .await
            .context("Failed to upload file material")
    }

    /// JSON metadata update for a file material, leaving the stored file alone.
    pub async fn update_material_metadata(
        &self,
        course_id: &str,
        material_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Value> {
        let response = self
            .client
            .put(self.url(&format!("/courses/{}/materials/{}", course_id, material_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({
                "name": name,
                "description": description,
            }))
            .send()
            .await
            .context("Failed to update material metadata")?;

        Self::expect_json(response, "Material metadata update").await
    }

    pub async fn replace_material_file(
        &self,
        course_id: &str,
        material_id: &str,
        name: &str,
        filename: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<Value> {
        let form = Self::file_form(name, None, filename, mime, content)?;

        let response = self
            .client
            .put(self.url(&format!("/courses/{}/materials/{}", course_id, material_id)))
            .header("Cookie", self.cookie_header())
            .multipart(form)
            .send()
            .await
            .context("Failed to replace material file")?;

        Self::expect_json(response, "Material file replacement").await
    }

    pub async fn delete_material(&self, course_id: &str, material_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/courses/{}/materials/{}", course_id, material_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to delete material")?;

        if !response.status().is_success() {
            anyhow::bail!("Material deletion failed: {}", response.status());
        }
        Ok(())
    }

    fn file_form(
        name: &str,
        description: Option<&str>,
        filename: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<Form> {
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str(mime)
            .context("Invalid fixture MIME type")?;

        let mut form = Form::new()
            .text("type", "file")
            .text("name", name.to_string());
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }

        Ok(form.part("file", part))
    }

    // --- quizzes ---

    pub async fn list_quizzes(&self, course_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(&format!("/courses/{}/quizzes", course_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to list quizzes")?;

        Self::expect_json(response, "Quiz listing").await
    }

    pub async fn create_quiz(&self, course_id: &str, quiz: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url(&format!("/courses/{}/quizzes", course_id)))
            .header("Cookie", self.cookie_header())
            .json(quiz)
            .send()
            .await
            .context("Failed to create quiz")?;

        Self::expect_json(response, "Quiz creation").await
    }

    pub async fn get_quiz(&self, course_id: &str, quiz_id: &str) -> Result<Value> {
        let response = self.get_quiz_raw(course_id, quiz_id).await?;
        Self::expect_json(response, "Quiz detail").await
    }

    pub async fn get_quiz_raw(&self, course_id: &str, quiz_id: &str) -> Result<Response> {
        self.client
            .get(self.url(&format!("/courses/{}/quizzes/{}", course_id, quiz_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to fetch quiz detail")
    }

    pub async fn update_quiz(&self, course_id: &str, quiz_id: &str, quiz: &Value) -> Result<Value> {
        let response = self
            .client
            .put(self.url(&format!("/courses/{}/quizzes/{}", course_id, quiz_id)))
            .header("Cookie", self.cookie_header())
            .json(quiz)
            .send()
            .await
            .context("Failed to update quiz")?;

        Self::expect_json(response, "Quiz update").await
    }

    pub async fn delete_quiz(&self, course_id: &str, quiz_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/courses/{}/quizzes/{}", course_id, quiz_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to delete quiz")?;

        Self::expect_no_content(response, "Quiz deletion").await
    }

    pub async fn submit_quiz(
        &self,
        course_id: &str,
        quiz_id: &str,
        answers: &Value,
    ) -> Result<Value> {
        let response = self
            .client
            .post(self.url(&format!("/courses/{}/quizzes/{}/submit", course_id, quiz_id)))
            .header("Cookie", self.cookie_header())
            .json(answers)
            .send()
            .await
            .context("Failed to submit quiz answers")?;

        Self::expect_json(response, "Quiz submission").await
    }

    // --- feed ---

    pub async fn list_feed(&self, course_id: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(&format!("/courses/{}/feed", course_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to list feed")?;

        Self::expect_json(response, "Feed listing").await
    }

    pub async fn create_feed_post(&self, course_id: &str, message: &str) -> Result<Value> {
        let response = self
            .client
            .post(self.url(&format!("/courses/{}/feed", course_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({ "message": message }))
            .send()
            .await
            .context("Failed to create feed post")?;

        Self::expect_json(response, "Feed post creation").await
    }

    pub async fn update_feed_post(
        &self,
        course_id: &str,
        post_id: &str,
        message: &str,
    ) -> Result<Value> {
        let response = self
            .client
            .put(self.url(&format!("/courses/{}/feed/{}", course_id, post_id)))
            .header("Cookie", self.cookie_header())
            .json(&json!({ "message": message, "edited": true }))
            .send()
            .await
            .context("Failed to update feed post")?;

        Self::expect_json(response, "Feed post update").await
    }

    pub async fn delete_feed_post(&self, course_id: &str, post_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/courses/{}/feed/{}", course_id, post_id)))
            .header("Cookie", self.cookie_header())
            .send()
            .await
            .context("Failed to delete feed post")?;

        Self::expect_no_content(response, "Feed post deletion").await
    }

    /// Opens the feed stream without consuming it, so scenarios can assert
    /// on the SSE response headers.
    pub async fn open_feed_stream(&self, course_id: &str) -> Result<Response> {
        self.client
            .get(self.url(&format!("/courses/{}/feed/stream", course_id)))
            .header("Cookie", self.cookie_header())
            .header("Accept", "text/event-stream")
            .send()
            .await
            .context("Failed to open feed stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_paths_onto_base() {
        let api = ApiClient::new(
            Client::new(),
            "http://localhost/api".to_string(),
            "token".to_string(),
        );
        assert_eq!(api.url("/courses"), "http://localhost/api/courses");
    }

    #[test]
    fn url_tolerates_trailing_slash_in_base() {
        let api = ApiClient::new(
            Client::new(),
            "http://localhost/api/".to_string(),
            "token".to_string(),
        );
        assert_eq!(api.url("/courses"), "http://localhost/api/courses");
    }

    #[test]
    fn cookie_header_names_the_session_cookie() {
        let api = ApiClient::new(
            Client::new(),
            "http://localhost/api".to_string(),
            "abc123".to_string(),
        );
        assert_eq!(api.cookie_header(), "auth_token=abc123");
    }
}
