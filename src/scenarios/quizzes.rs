use anyhow::{ensure, Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api_client::ApiClient;
use crate::fixtures::is_uuid_v4;
use crate::output::{confirmed, step};

fn single_choice_question() -> Value {
    json!({
        "type": "singleChoice",
        "question": "What is 2 + 2?",
        "options": ["3", "4", "5", "6"],
        "correctIndex": 1,
    })
}

fn multiple_choice_question() -> Value {
    json!({
        "type": "multipleChoice",
        "question": "Which are prime numbers?",
        "options": ["2", "3", "4", "5"],
        "correctIndices": [0, 1, 3],
    })
}

pub async fn quiz_crud(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Quiz Test Course", "Testing course quizzes")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Listing quizzes of a fresh course");
    let quizzes = api.list_quizzes(course_id).await?;
    ensure!(
        quizzes.as_array().is_some_and(|q| q.is_empty()),
        "fresh course has quizzes: {}",
        quizzes
    );

    step("Creating a single-choice quiz");
    let quiz = api
        .create_quiz(
            course_id,
            &json!({
                "title": "Introduction Quiz",
                "questions": [single_choice_question()],
            }),
        )
        .await?;
    let quiz_id = quiz["uuid"]
        .as_str()
        .context("no uuid in created quiz")?
        .to_string();
    ensure!(quiz["title"] == "Introduction Quiz", "quiz title mismatch");
    ensure!(
        quiz["questions"][0]["type"] == "singleChoice",
        "question type mismatch"
    );
    ensure!(
        quiz["questions"][0]["uuid"]
            .as_str()
            .is_some_and(is_uuid_v4),
        "question was not assigned a v4 uuid"
    );
    confirmed(&format!("Quiz created (ID: {})", quiz_id));

    step("Fetching quiz detail");
    let detail = api.get_quiz(course_id, &quiz_id).await?;
    ensure!(detail["uuid"] == quiz_id.as_str(), "quiz detail uuid mismatch");
    ensure!(
        detail["questions"].as_array().is_some_and(|q| q.len() == 1),
        "quiz detail does not have exactly one question"
    );

    step("Updating the quiz title");
    let updated = api
        .update_quiz(
            course_id,
            &quiz_id,
            &json!({
                "title": "Updated Introduction Quiz",
                "questions": [single_choice_question()],
            }),
        )
        .await?;
    ensure!(
        updated["title"] == "Updated Introduction Quiz",
        "quiz title was not updated: {}",
        updated["title"]
    );

    step("Adding a multiple-choice question");
    let updated = api
        .update_quiz(
            course_id,
            &quiz_id,
            &json!({
                "title": "Updated Introduction Quiz",
                "questions": [single_choice_question(), multiple_choice_question()],
            }),
        )
        .await?;
    ensure!(
        updated["questions"].as_array().is_some_and(|q| q.len() == 2),
        "quiz does not have two questions after update"
    );

    step("Checking the course detail embeds quizzes");
    let detail = api.get_course(course_id).await?;
    ensure!(
        detail["quizzes"].as_array().is_some_and(|q| !q.is_empty()),
        "course detail does not embed the quiz"
    );

    step("Deleting the quiz");
    api.delete_quiz(course_id, &quiz_id).await?;
    let missing = api.get_quiz_raw(course_id, &quiz_id).await?;
    ensure!(
        missing.status() == StatusCode::NOT_FOUND,
        "deleted quiz returned {} instead of 404",
        missing.status()
    );
    confirmed("Quiz deleted and gone");

    api.delete_course(course_id).await
}

pub async fn quiz_scoring(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Quiz Test Course", "Testing quiz scoring")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Creating a quiz with both question types");
    let quiz = api
        .create_quiz(
            course_id,
            &json!({
                "title": "Scoring Quiz",
                "questions": [single_choice_question(), multiple_choice_question()],
            }),
        )
        .await?;
    let quiz_id = quiz["uuid"].as_str().context("no quiz uuid")?;

    let questions = quiz["questions"]
        .as_array()
        .context("created quiz has no questions array")?;
    let single_uuid = questions
        .iter()
        .find(|q| q["type"] == "singleChoice")
        .and_then(|q| q["uuid"].as_str())
        .context("no single-choice question uuid")?;
    let multiple_uuid = questions
        .iter()
        .find(|q| q["type"] == "multipleChoice")
        .and_then(|q| q["uuid"].as_str())
        .context("no multiple-choice question uuid")?;

    step("Submitting all-correct answers");
    let outcome = api
        .submit_quiz(
            course_id,
            quiz_id,
            &json!({
                "answers": [
                    { "uuid": single_uuid, "selectedIndex": 1 },
                    { "uuid": multiple_uuid, "selectedIndices": [0, 1, 3] },
                ]
            }),
        )
        .await?;
    let score = outcome["score"].as_i64().context("no score in outcome")?;
    let max_score = outcome["maxScore"]
        .as_i64()
        .context("no maxScore in outcome")?;
    ensure!(
        score == max_score,
        "correct submission scored {}/{}",
        score,
        max_score
    );
    confirmed(&format!("Full marks: {}/{}", score, max_score));

    step("Submitting wrong answers");
    let outcome = api
        .submit_quiz(
            course_id,
            quiz_id,
            &json!({
                "answers": [
                    { "uuid": single_uuid, "selectedIndex": 0 },
                    { "uuid": multiple_uuid, "selectedIndices": [0, 2] },
                ]
            }),
        )
        .await?;
    let score = outcome["score"].as_i64().context("no score in outcome")?;
    let max_score = outcome["maxScore"]
        .as_i64()
        .context("no maxScore in outcome")?;
    ensure!(
        score < max_score,
        "wrong submission still scored {}/{}",
        score,
        max_score
    );
    confirmed(&format!("Partial marks: {}/{}", score, max_score));

    api.delete_course(course_id).await
}

pub async fn quiz_uuid_format(api: &ApiClient) -> Result<()> {
    let course = api
        .create_course("Quiz Test Course", "Testing quiz uuid format")
        .await?;
    let course_id = course["uuid"].as_str().context("no course uuid")?;

    step("Creating a quiz and checking assigned ids");
    let quiz = api
        .create_quiz(
            course_id,
            &json!({
                "title": "UUID Test Quiz",
                "questions": [single_choice_question()],
            }),
        )
        .await?;

    ensure!(
        quiz["uuid"].as_str().is_some_and(is_uuid_v4),
        "quiz uuid is not a v4 uuid: {}",
        quiz["uuid"]
    );
    for question in quiz["questions"].as_array().into_iter().flatten() {
        ensure!(
            question["uuid"].as_str().is_some_and(is_uuid_v4),
            "question uuid is not a v4 uuid: {}",
            question["uuid"]
        );
    }

    api.delete_course(course_id).await
}
