// End-to-end run against a live deployment. Ignored by default; point
// COURSE_API_BASE_URL at a running backend to exercise it:
//
//   COURSE_API_BASE_URL=http://localhost/api cargo test -- --ignored

use course_api_test_client::api_client::ApiClient;
use course_api_test_client::auth::{self, UserCredentials};
use course_api_test_client::scenarios::{self, run};

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a live backend; set COURSE_API_BASE_URL"]
async fn full_suite_against_live_backend() {
    let base_url = std::env::var("COURSE_API_BASE_URL")
        .expect("COURSE_API_BASE_URL must point at a running backend");

    let client = reqwest::Client::new();
    let credentials = UserCredentials::fresh();
    auth::register(&client, &base_url, &credentials)
        .await
        .expect("registration failed");
    let user = auth::login(&client, &base_url, &credentials)
        .await
        .expect("login failed");
    let api = ApiClient::new(client.clone(), base_url.clone(), user.session_cookie);

    let results = vec![
        run(
            "registration and login",
            scenarios::auth::registration_and_login(&client, &base_url),
        )
        .await,
        run(
            "credential validation",
            scenarios::auth::rejects_bad_credentials(&client, &base_url),
        )
        .await,
        run("course crud", scenarios::courses::course_crud(&api)).await,
        run("url materials", scenarios::materials::url_materials(&api)).await,
        run("file materials", scenarios::materials::file_materials(&api)).await,
        run(
            "upload validation",
            scenarios::materials::upload_validation(&api),
        )
        .await,
        run(
            "supported formats",
            scenarios::materials::supported_formats(&api),
        )
        .await,
        run(
            "material ordering",
            scenarios::materials::material_ordering(&api),
        )
        .await,
        run("quiz crud", scenarios::quizzes::quiz_crud(&api)).await,
        run("quiz scoring", scenarios::quizzes::quiz_scoring(&api)).await,
        run(
            "quiz uuid format",
            scenarios::quizzes::quiz_uuid_format(&api),
        )
        .await,
        run("manual feed posts", scenarios::feed::manual_posts(&api)).await,
        run("system feed posts", scenarios::feed::system_posts(&api)).await,
        run("feed ordering", scenarios::feed::feed_ordering(&api)).await,
        run("feed timestamps", scenarios::feed::feed_timestamps(&api)).await,
        run("feed stream headers", scenarios::feed::stream_headers(&api)).await,
        run(
            "feed stream delivery",
            scenarios::feed::stream_delivery(&api),
        )
        .await,
    ];

    let failures: Vec<String> = results
        .into_iter()
        .filter(|r| !r.passed)
        .map(|r| format!("{}: {}", r.scenario, r.message.unwrap_or_default()))
        .collect();

    assert!(failures.is_empty(), "failed scenarios: {:?}", failures);
}
