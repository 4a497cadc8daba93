// Black-box integration tests for the course management API.
//
// Nothing in this crate implements the backend; every module drives a live
// deployment over HTTP and asserts on status codes and JSON payloads.
// - api_client: reqwest wrapper over the REST surface
// - auth: register/login helpers and session cookie handling
// - fixtures: in-memory upload payloads and format checks
// - sse_client: feed stream listener built on eventsource-client
// - scenarios: the test scenarios themselves, one module per API area
// - output: colored progress and summary printing

pub mod api_client;
pub mod auth;
pub mod fixtures;
pub mod output;
pub mod scenarios;
pub mod sse_client;
