use anyhow::{ensure, Result};
use reqwest::{Client, StatusCode};

use crate::auth::{self, UserCredentials};
use crate::output::{confirmed, step};

/// Register a fresh account, log in, and read the profile back.
pub async fn registration_and_login(client: &Client, base_url: &str) -> Result<()> {
    let credentials = UserCredentials::fresh();

    step(&format!("Registering {}", credentials.email));
    let registered = auth::register(client, base_url, &credentials).await?;
    ensure!(
        !registered.session_cookie.is_empty(),
        "register response set an empty session cookie"
    );
    confirmed("Registration set a session cookie");

    step("Logging in with the same credentials");
    let user = auth::login(client, base_url, &credentials).await?;
    ensure!(
        !user.session_cookie.is_empty(),
        "login response set an empty session cookie"
    );
    confirmed("Login set a session cookie");

    step("Fetching the profile");
    let response = auth::profile_raw(client, base_url, Some(&user.session_cookie)).await?;
    ensure!(
        response.status().is_success(),
        "profile fetch failed: {}",
        response.status()
    );
    let profile: serde_json::Value = response.json().await?;
    ensure!(
        profile["email"] == credentials.email.as_str(),
        "profile email does not match the registered account: {}",
        profile["email"]
    );

    Ok(())
}

/// The backend must refuse duplicate emails, wrong passwords, unknown
/// accounts, and unauthenticated profile reads.
pub async fn rejects_bad_credentials(client: &Client, base_url: &str) -> Result<()> {
    let credentials = UserCredentials::fresh();

    step(&format!("Registering {}", credentials.email));
    auth::register(client, base_url, &credentials).await?;

    step("Registering the same email again");
    let duplicate = auth::register_raw(client, base_url, &credentials).await?;
    ensure!(
        duplicate.status() == StatusCode::BAD_REQUEST,
        "duplicate registration returned {} instead of 400",
        duplicate.status()
    );

    step("Logging in with the wrong password");
    let wrong_password =
        auth::login_raw(client, base_url, &credentials.email, "not-the-password").await?;
    ensure!(
        wrong_password.status() == StatusCode::UNAUTHORIZED,
        "wrong password returned {} instead of 401",
        wrong_password.status()
    );

    step("Logging in with an unknown email");
    let unknown =
        auth::login_raw(client, base_url, "nobody@example.invalid", "password123").await?;
    ensure!(
        unknown.status() == StatusCode::BAD_REQUEST,
        "unknown email returned {} instead of 400",
        unknown.status()
    );

    step("Fetching the profile without a session");
    let anonymous = auth::profile_raw(client, base_url, None).await?;
    ensure!(
        anonymous.status() == StatusCode::UNAUTHORIZED,
        "unauthenticated profile fetch returned {} instead of 401",
        anonymous.status()
    );

    Ok(())
}
