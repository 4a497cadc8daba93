use std::time::Duration;

use anyhow::{ensure, Context, Result};
use reqwest::StatusCode;

use crate::api_client::ApiClient;
use crate::fixtures::{
    is_uuid_v4, oversized_payload, SUPPORTED_FORMATS, UNSUPPORTED_EXECUTABLE,
};
use crate::output::{confirmed, step};
use crate::scenarios::position_by;

pub async fn url_materials(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Material Test Course", "Testing URL materials")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Listing materials of a fresh course");
    let materials = api.list_materials(course_id).await?;
    ensure!(
        materials.as_array().is_some_and(|m| m.is_empty()),
        "fresh course has materials: {}",
        materials
    );

    step("Creating a URL material");
    let material = api
        .create_url_material(
            course_id,
            "Official Documentation",
            "Link to docs",
            "https://example.com/docs",
        )
        .await?;
    let material_id = material["uuid"]
        .as_str()
        .context("no uuid in created material")?;
    ensure!(material["type"] == "url", "material type is not url");
    ensure!(is_uuid_v4(material_id), "material uuid is not a v4 uuid");
    confirmed(&format!("URL material created (ID: {})", material_id));

    step("Updating the URL material");
    api.update_url_material(
        course_id,
        material_id,
        "Updated Docs",
        "Updated",
        "https://example.com/new",
    )
    .await?;
    let listing = api.list_materials(course_id).await?;
    let updated = listing
        .as_array()
        .context("material listing is not an array")?
        .iter()
        .find(|m| m["uuid"] == material_id)
        .context("updated material missing from listing")?;
    ensure!(
        updated["name"] == "Updated Docs",
        "material name was not updated: {}",
        updated["name"]
    );

    step("Deleting the URL material");
    api.delete_material(course_id, material_id).await?;
    let listing = api.list_materials(course_id).await?;
    ensure!(
        !listing
            .as_array()
            .is_some_and(|m| m.iter().any(|item| item["uuid"] == material_id)),
        "deleted material still listed"
    );

    api.delete_course(course_id).await
}

pub async fn file_materials(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Material Test Course", "Testing file materials")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Uploading a text file");
    let material = api
        .upload_file_material(
            course_id,
            "Course Syllabus",
            "Uploaded by automated test",
            "syllabus.txt",
            "text/plain",
            b"Hello from API test".to_vec(),
        )
        .await?;
    let material_id = material["uuid"]
        .as_str()
        .context("no uuid in uploaded material")?;
    ensure!(material["type"] == "file", "material type is not file");
    ensure!(
        material["mimeType"] == "text/plain",
        "unexpected mimeType: {}",
        material["mimeType"]
    );
    ensure!(
        material["sizeBytes"].as_i64().unwrap_or(0) > 0,
        "uploaded material reports no size"
    );
    ensure!(
        material["fileUrl"].as_str().is_some_and(|u| !u.is_empty()),
        "uploaded material has no fileUrl"
    );
    confirmed(&format!("File material created (ID: {})", material_id));

    step("Updating file material metadata");
    api.update_material_metadata(course_id, material_id, "Updated Syllabus", "Updated description")
        .await?;

    step("Replacing the stored file");
    api.replace_material_file(
        course_id,
        material_id,
        "Replaced Syllabus",
        "syllabus-v2.txt",
        "text/plain",
        b"Hello from API test UPDATE".to_vec(),
    )
    .await?;

    step("Deleting the file material");
    api.delete_material(course_id, material_id).await?;

    api.delete_course(course_id).await
}

pub async fn upload_validation(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Material Test Course", "Testing upload validation")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Uploading a file past the 30 MiB cap");
    let response = api
        .upload_file_material_raw(
            course_id,
            "Too Large",
            "Should fail",
            "big.bin",
            "application/octet-stream",
            oversized_payload(),
        )
        .await?;
    ensure!(
        response.status() == StatusCode::BAD_REQUEST,
        "oversized upload returned {} instead of 400",
        response.status()
    );
    confirmed("Oversized upload rejected");

    step("Uploading an unsupported file type");
    let response = api
        .upload_file_material_raw(
            course_id,
            "Bad File",
            "Should fail",
            UNSUPPORTED_EXECUTABLE.filename,
            UNSUPPORTED_EXECUTABLE.mime,
            UNSUPPORTED_EXECUTABLE.content.to_vec(),
        )
        .await?;
    ensure!(
        response.status() == StatusCode::BAD_REQUEST,
        "unsupported upload returned {} instead of 400",
        response.status()
    );
    confirmed("Unsupported file type rejected");

    api.delete_course(course_id).await
}

pub async fn supported_formats(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Material Test Course", "Testing supported formats")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    for fixture in SUPPORTED_FORMATS {
        step(&format!("Uploading {}", fixture.filename));
        let material = api
            .upload_file_material(
                course_id,
                &format!("Test {} file", fixture.filename),
                &format!("Testing {}", fixture.mime),
                fixture.filename,
                fixture.mime,
                fixture.content.to_vec(),
            )
            .await?;

        ensure!(
            material["type"] == "file",
            "{} was not stored as a file material",
            fixture.filename
        );
        ensure!(
            material["mimeType"] == fixture.mime,
            "{} stored with mimeType {} instead of {}",
            fixture.filename,
            material["mimeType"],
            fixture.mime
        );
    }
    confirmed("Every supported format accepted");

    api.delete_course(course_id).await
}

pub async fn material_ordering(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Material Test Course", "Testing material ordering")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    // The backend timestamps at second granularity, so pace the creations.
    for name in ["First", "Second", "Third"] {
        step(&format!("Creating material {:?}", name));
        api.create_url_material(
            course_id,
            name,
            name,
            &format!("https://example.com/{}", name.to_lowercase()),
        )
        .await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    step("Checking newest-first ordering");
    let listing = api.list_materials(course_id).await?;
    let third = position_by(&listing, "name", "Third")?;
    let second = position_by(&listing, "name", "Second")?;
    let first = position_by(&listing, "name", "First")?;
    ensure!(
        third < second && second < first,
        "materials are not newest-first: Third={}, Second={}, First={}",
        third,
        second,
        first
    );

    step("Checking the course detail embeds materials");
    let detail = api.get_course(course_id).await?;
    ensure!(
        detail["materials"].as_array().is_some_and(|m| m.len() >= 3),
        "course detail does not embed the materials"
    );

    api.delete_course(course_id).await
}
