use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::api_client::ApiClient;
use crate::fixtures::is_uuid_v4;
use crate::output::{confirmed, print_event, step};
use crate::scenarios::position_by;
use crate::sse_client::FeedStream;

pub async fn manual_posts(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing the course feed")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Listing the feed of a fresh course");
    let feed = api.list_feed(course_id).await?;
    ensure!(
        feed.as_array().is_some_and(|f| f.is_empty()),
        "fresh course has feed items: {}",
        feed
    );

    step("Creating a manual post");
    let message = "Welcome to the course! New materials will be published next week.";
    let post = api.create_feed_post(course_id, message).await?;
    let post_id = post["uuid"]
        .as_str()
        .context("no uuid in created post")?
        .to_string();
    ensure!(post["type"] == "manual", "post type is not manual");
    ensure!(post["message"] == message, "post message mismatch");
    ensure!(
        !post["edited"].as_bool().unwrap_or(false),
        "fresh post is already marked edited"
    );
    ensure!(
        post["createdAt"].as_str().is_some_and(|t| !t.is_empty()),
        "post has no createdAt"
    );
    ensure!(is_uuid_v4(&post_id), "post uuid is not a v4 uuid");
    confirmed(&format!("Manual post created (ID: {})", post_id));

    step("Retrieving the post from the listing");
    let feed = api.list_feed(course_id).await?;
    let listed = feed
        .as_array()
        .context("feed listing is not an array")?
        .iter()
        .find(|item| item["uuid"] == post_id.as_str())
        .context("created post missing from feed listing")?;
    ensure!(listed["message"] == message, "listed post message mismatch");

    step("Updating the post");
    let updated = api
        .update_feed_post(
            course_id,
            &post_id,
            "Updated: Materials will be published this Friday!",
        )
        .await?;
    ensure!(updated["uuid"] == post_id.as_str(), "updated post uuid changed");
    ensure!(
        updated["edited"].as_bool().unwrap_or(false),
        "updated post is not marked edited"
    );
    ensure!(
        updated["updatedAt"].as_str().is_some_and(|t| !t.is_empty()),
        "updated post has no updatedAt"
    );

    step("Creating a few more posts");
    for message in [
        "Quiz will be available next Monday",
        "Office hours scheduled for Wednesday",
        "Important: Assignment deadline extended",
    ] {
        let post = api.create_feed_post(course_id, message).await?;
        ensure!(post["message"] == message, "post message mismatch");
        ensure!(post["type"] == "manual", "post type is not manual");
    }
    let feed = api.list_feed(course_id).await?;
    ensure!(
        feed.as_array().is_some_and(|f| f.len() >= 4),
        "feed is missing posts"
    );

    step("Deleting the first post");
    api.delete_feed_post(course_id, &post_id).await?;
    let feed = api.list_feed(course_id).await?;
    ensure!(
        !feed
            .as_array()
            .is_some_and(|f| f.iter().any(|item| item["uuid"] == post_id.as_str())),
        "deleted post still listed"
    );
    confirmed("Post deleted and gone from the feed");

    api.delete_course(course_id).await
}

/// Creating a material or quiz must append a system post to the feed.
pub async fn system_posts(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing system feed posts")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Creating a material and looking for a system post");
    let before = api.list_feed(course_id).await?;
    let before_count = before.as_array().map(|f| f.len()).unwrap_or(0);
    api.create_url_material(
        course_id,
        "Course Materials",
        "Link to course materials",
        "https://example.com/materials",
    )
    .await?;
    let after = api.list_feed(course_id).await?;
    ensure!(
        after.as_array().map(|f| f.len()).unwrap_or(0) > before_count,
        "material creation did not grow the feed"
    );
    let system_post = after
        .as_array()
        .context("feed listing is not an array")?
        .iter()
        .find(|item| {
            item["type"] == "system"
                && item["message"]
                    .as_str()
                    .is_some_and(|m| m.to_lowercase().contains("material"))
        })
        .context("no system post about the material")?;
    ensure!(
        system_post["createdAt"].as_str().is_some(),
        "system post has no createdAt"
    );
    confirmed("Material creation produced a system post");

    step("Creating a quiz and looking for a system post");
    let before_count = after.as_array().map(|f| f.len()).unwrap_or(0);
    api.create_quiz(
        course_id,
        &serde_json::json!({
            "title": "Test Quiz",
            "questions": [{
                "type": "singleChoice",
                "question": "What is 1 + 1?",
                "options": ["1", "2", "3", "4"],
                "correctIndex": 1,
            }],
        }),
    )
    .await?;
    let after = api.list_feed(course_id).await?;
    ensure!(
        after.as_array().map(|f| f.len()).unwrap_or(0) > before_count,
        "quiz creation did not grow the feed"
    );
    ensure!(
        after
            .as_array()
            .is_some_and(|f| f.iter().any(|item| {
                item["type"] == "system"
                    && item["message"]
                        .as_str()
                        .is_some_and(|m| m.to_lowercase().contains("quiz"))
            })),
        "no system post about the quiz"
    );
    confirmed("Quiz creation produced a system post");

    step("Checking the course detail embeds the feed");
    let detail = api.get_course(course_id).await?;
    let embedded = detail["feed"]
        .as_array()
        .context("course detail has no feed array")?;
    ensure!(!embedded.is_empty(), "course detail feed is empty");
    for item in embedded {
        ensure!(item["uuid"].as_str().is_some(), "feed item has no uuid");
        ensure!(
            item["type"] == "manual" || item["type"] == "system",
            "feed item has unknown type: {}",
            item["type"]
        );
        ensure!(item["message"].as_str().is_some(), "feed item has no message");
        ensure!(
            item["createdAt"].as_str().is_some(),
            "feed item has no createdAt"
        );
    }

    api.delete_course(course_id).await
}

pub async fn feed_ordering(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing feed ordering")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    // Same second-granularity pacing as the material ordering check.
    for message in ["First post", "Second post", "Third post"] {
        step(&format!("Creating {:?}", message));
        api.create_feed_post(course_id, message).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    step("Checking newest-first ordering");
    let feed = api.list_feed(course_id).await?;
    let third = position_by(&feed, "message", "Third post")?;
    let second = position_by(&feed, "message", "Second post")?;
    let first = position_by(&feed, "message", "First post")?;
    ensure!(
        third < second && second < first,
        "feed is not newest-first: Third={}, Second={}, First={}",
        third,
        second,
        first
    );

    api.delete_course(course_id).await
}

pub async fn feed_timestamps(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing feed timestamps")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Creating a post and checking createdAt");
    let post = api.create_feed_post(course_id, "Timestamp test post").await?;
    let post_id = post["uuid"].as_str().context("no post uuid")?;
    ensure!(
        post["createdAt"].as_str().is_some_and(|t| !t.is_empty()),
        "created post has no createdAt"
    );

    tokio::time::sleep(Duration::from_millis(100)).await;

    step("Updating the post and checking updatedAt");
    let updated = api
        .update_feed_post(course_id, post_id, "Updated timestamp test post")
        .await?;
    ensure!(
        updated["updatedAt"].as_str().is_some_and(|t| !t.is_empty()),
        "updated post has no updatedAt"
    );

    api.delete_course(course_id).await
}

pub async fn stream_headers(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing the feed stream headers")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Opening the feed stream");
    let response = api.open_feed_stream(course_id).await?;
    ensure!(
        response.status().is_success(),
        "feed stream returned {}",
        response.status()
    );
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    ensure!(
        content_type.contains("text/event-stream"),
        "feed stream content type is {:?}",
        content_type
    );
    confirmed("Stream answers with text/event-stream");
    drop(response);

    api.delete_course(course_id).await
}

/// A connected listener must see a new_post event when a feed post lands.
pub async fn stream_delivery(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Feed Test Course", "Testing live feed delivery")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Connecting to the feed stream");
    let mut stream =
        FeedStream::connect(api.base_url(), course_id, api.session_cookie()).await?;

    // Give the subscription a moment before producing the event.
    tokio::time::sleep(Duration::from_millis(500)).await;

    step("Creating a post while listening");
    api.create_feed_post(course_id, "SSE test post").await?;

    step("Waiting for the new_post event");
    let event = stream
        .wait_for_event("new_post", Duration::from_secs(10))
        .await?;
    print_event(&event);
    ensure!(
        event.data["message"] == "SSE test post",
        "streamed post carries the wrong message: {}",
        event.data["message"]
    );
    confirmed("Listener received the new post");

    api.delete_course(course_id).await
}
