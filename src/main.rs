use anyhow::Result;
use clap::Parser;
use colored::*;

use course_api_test_client::api_client::ApiClient;
use course_api_test_client::auth::{self, UserCredentials};
use course_api_test_client::output::{print_test_summary, summarize};
use course_api_test_client::scenarios::{self, run};

#[derive(Parser)]
#[command(name = "course-api-test-client")]
#[command(about = "Black-box integration tests for the course management API")]
struct Cli {
    /// Base URL of the API under test (e.g., http://localhost/api)
    #[arg(long)]
    base_url: String,

    /// Existing account to use (format: email:password); a fresh account is
    /// registered when omitted
    #[arg(long)]
    credentials: Option<String>,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, PartialEq)]
enum ScenarioChoice {
    /// Registration, login and profile checks
    Auth,
    /// Course CRUD
    Courses,
    /// URL and file materials, upload validation, ordering
    Materials,
    /// Quiz CRUD, scoring and id assignment
    Quizzes,
    /// Feed posts, system events and SSE streaming
    Feed,
    /// Run every scenario
    All,
}

impl ScenarioChoice {
    fn includes(self, other: ScenarioChoice) -> bool {
        self == ScenarioChoice::All || self == other
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let client = reqwest::Client::new();

    let user = match &cli.credentials {
        Some(raw) => {
            let credentials = UserCredentials::parse(raw)?;
            println!("{} Logging in as {}...", "→".blue(), credentials.email);
            auth::login(&client, &cli.base_url, &credentials).await?
        }
        None => {
            let credentials = UserCredentials::fresh();
            println!(
                "{} Registering fresh account {}...",
                "→".blue(),
                credentials.email
            );
            auth::register(&client, &cli.base_url, &credentials).await?;
            auth::login(&client, &cli.base_url, &credentials).await?
        }
    };

    println!("{} Authenticated as {}", "✓".green(), user.email);

    let api = ApiClient::new(
        client.clone(),
        cli.base_url.clone(),
        user.session_cookie.clone(),
    );

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    if cli.scenario.includes(ScenarioChoice::Auth) {
        results.push(
            run(
                "registration and login",
                scenarios::auth::registration_and_login(&client, &cli.base_url),
            )
            .await,
        );
        results.push(
            run(
                "credential validation",
                scenarios::auth::rejects_bad_credentials(&client, &cli.base_url),
            )
            .await,
        );
    }

    if cli.scenario.includes(ScenarioChoice::Courses) {
        results.push(run("course crud", scenarios::courses::course_crud(&api)).await);
    }

    if cli.scenario.includes(ScenarioChoice::Materials) {
        results.push(run("url materials", scenarios::materials::url_materials(&api)).await);
        results.push(run("file materials", scenarios::materials::file_materials(&api)).await);
        results.push(
            run(
                "upload validation",
                scenarios::materials::upload_validation(&api),
            )
            .await,
        );
        results.push(
            run(
                "supported formats",
                scenarios::materials::supported_formats(&api),
            )
            .await,
        );
        results.push(
            run(
                "material ordering",
                scenarios::materials::material_ordering(&api),
            )
            .await,
        );
    }

    if cli.scenario.includes(ScenarioChoice::Quizzes) {
        results.push(run("quiz crud", scenarios::quizzes::quiz_crud(&api)).await);
        results.push(run("quiz scoring", scenarios::quizzes::quiz_scoring(&api)).await);
        results.push(run("quiz uuid format", scenarios::quizzes::quiz_uuid_format(&api)).await);
    }

    if cli.scenario.includes(ScenarioChoice::Feed) {
        results.push(run("manual feed posts", scenarios::feed::manual_posts(&api)).await);
        results.push(run("system feed posts", scenarios::feed::system_posts(&api)).await);
        results.push(run("feed ordering", scenarios::feed::feed_ordering(&api)).await);
        results.push(run("feed timestamps", scenarios::feed::feed_timestamps(&api)).await);
        results.push(run("feed stream headers", scenarios::feed::stream_headers(&api)).await);
        results.push(run("feed stream delivery", scenarios::feed::stream_delivery(&api)).await);
    }

    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let (_, failed) = summarize(&results);

    if failed == 0 {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if failed == 0 { 0 } else { 1 });
}
