//! Demonstrates a signed admin API user lookup and mobile number check against a local mock of
//! the admin API.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use duo_connector::{
	admin::{AdminClient, USERS_PATH},
	auth::{IntegrationKey, SecretKey},
	clock::SystemClock,
	http::ReqwestAdminTransport,
	reqwest::Client,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let users_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(USERS_PATH)
				.query_param("username", "jane")
				.header_exists("authorization")
				.header_exists("date");
			then.status(200).header("content-type", "application/json").body(
				r#"{"stat":"OK","response":[{"username":"jane","phones":[{"number":"+15555550100"}]}]}"#,
			);
		})
		.await;
	let client = <AdminClient<ReqwestAdminTransport>>::new(
		ReqwestAdminTransport::with_client(Client::new()),
		server.address().to_string(),
		&IntegrationKey::new("DIXXXXXXXXXXXXXXXXXX")?,
		&SecretKey::new("ssssssssssssssssssssssssssssssssssssssss")?,
	)?
	.with_scheme("http")
	.with_clock(Arc::new(SystemClock));
	let users = client.users_by_username("jane").await?;

	println!("Found {} user(s); first has {} phone(s).", users.len(), users[0].phones.len());

	let user = client.verify_mobile_number("jane", "+15555550100").await?;

	println!("Mobile number verified for {}.", user.username);

	users_mock.assert_calls_async(2).await;

	Ok(())
}
