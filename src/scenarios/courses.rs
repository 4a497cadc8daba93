use anyhow::{ensure, Context, Result};

use crate::api_client::ApiClient;
use crate::fixtures::is_uuid_v4;
use crate::output::{confirmed, step};

pub async fn course_crud(api: &ApiClient) -> Result<()> {
    step("Checking the API root");
    api.root().await?;

    step("Listing courses");
    let courses = api.list_courses().await?;
    ensure!(courses.is_array(), "course listing is not an array");

    step("Creating a course");
    let course = api
        .create_course("API Test Course", "Created by automated test")
        .await?;
    let course_id = course["uuid"]
        .as_str()
        .context("no uuid in created course")?
        .to_string();
    ensure!(
        is_uuid_v4(&course_id),
        "course uuid is not a v4 uuid: {}",
        course_id
    );
    confirmed(&format!("Course created (ID: {})", course_id));

    step("Fetching course detail");
    let detail = api.get_course(&course_id).await?;
    ensure!(
        detail["uuid"] == course_id.as_str(),
        "course detail uuid mismatch"
    );
    ensure!(
        detail["materials"].is_array(),
        "course detail has no materials array"
    );
    ensure!(
        detail["quizzes"].is_array(),
        "course detail has no quizzes array"
    );
    ensure!(detail["feed"].is_array(), "course detail has no feed array");

    step("Updating the course");
    api.update_course(&course_id, "API Test Course (renamed)", "Updated description")
        .await?;
    let updated = api.get_course(&course_id).await?;
    ensure!(
        updated["name"] == "API Test Course (renamed)",
        "course name was not updated: {}",
        updated["name"]
    );
    ensure!(
        updated["description"] == "Updated description",
        "course description was not updated: {}",
        updated["description"]
    );

    step("Deleting the course");
    api.delete_course(&course_id).await?;
    let missing = api.get_course_raw(&course_id).await?;
    ensure!(
        missing.status() == reqwest::StatusCode::NOT_FOUND,
        "deleted course returned {} instead of 404",
        missing.status()
    );
    confirmed("Course deleted and gone");

    Ok(())
}
