use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use uuid::Uuid;

/// Name of the session cookie the backend sets on register and login.
pub const SESSION_COOKIE: &str = "auth_token";

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid credentials format. Expected email:password");
        }
        Ok(Self {
            email: parts[0].to_string(),
            password: parts[1].to_string(),
        })
    }

    /// A throwaway identity for a fresh registration, unique per run.
    pub fn fresh() -> Self {
        Self {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password: "password123".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub session_cookie: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    firstname: &'a str,
    lastname: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

pub async fn register(
    client: &Client,
    base_url: &str,
    credentials: &UserCredentials,
) -> Result<AuthenticatedUser> {
    let response = register_raw(client, base_url, credentials).await?;

    if !response.status().is_success() {
        anyhow::bail!("Registration failed: {}", response.status());
    }

    let session_cookie =
        session_cookie_from(&response).context("No session cookie in register response")?;

    Ok(AuthenticatedUser {
        email: credentials.email.clone(),
        session_cookie,
    })
}

/// Sends the register request without checking the outcome, for scenarios
/// asserting on specific failure codes.
pub async fn register_raw(
    client: &Client,
    base_url: &str,
    credentials: &UserCredentials,
) -> Result<Response> {
    let url = format!("{}/register", base_url.trim_end_matches('/'));

    client
        .post(&url)
        .json(&RegisterRequest {
            firstname: "Test",
            lastname: "User",
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .await
        .context("Failed to send register request")
}

pub async fn login(
    client: &Client,
    base_url: &str,
    credentials: &UserCredentials,
) -> Result<AuthenticatedUser> {
    let response = login_raw(client, base_url, &credentials.email, &credentials.password).await?;

    if !response.status().is_success() {
        anyhow::bail!("Login failed: {}", response.status());
    }

    let session_cookie =
        session_cookie_from(&response).context("No session cookie in login response")?;

    Ok(AuthenticatedUser {
        email: credentials.email.clone(),
        session_cookie,
    })
}

pub async fn login_raw(
    client: &Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<Response> {
    let url = format!("{}/login", base_url.trim_end_matches('/'));

    client
        .post(&url)
        .json(&LoginRequest { email, password })
        .send()
        .await
        .context("Failed to send login request")
}

/// Fetches `/me`, optionally with a session cookie attached.
pub async fn profile_raw(
    client: &Client,
    base_url: &str,
    session_cookie: Option<&str>,
) -> Result<Response> {
    let url = format!("{}/me", base_url.trim_end_matches('/'));

    let mut request = client.get(&url);
    if let Some(cookie) = session_cookie {
        request = request.header("Cookie", format!("{}={}", SESSION_COOKIE, cookie));
    }

    request.send().await.context("Failed to fetch profile")
}

fn session_cookie_from(response: &Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_email_password_pair() {
        let creds = UserCredentials::parse("student@example.com:hunter2").unwrap();
        assert_eq!(creds.email, "student@example.com");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(UserCredentials::parse("student@example.com").is_err());
    }

    #[test]
    fn parse_rejects_extra_separator() {
        assert!(UserCredentials::parse("student@example.com:a:b").is_err());
    }

    #[test]
    fn fresh_identities_are_unique() {
        let a = UserCredentials::fresh();
        let b = UserCredentials::fresh();
        assert_ne!(a.email, b.email);
        assert!(a.email.ends_with("@example.com"));
    }
}
