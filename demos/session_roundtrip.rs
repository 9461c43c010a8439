//! Signs in against a mock backend, reads a protected resource through the authorized client,
//! and signs out, persisting the session in a JSON file along the way.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use url::Url;
// self
use session_client::{
	client::ReqwestSessionClient,
	config::ClientConfig,
	request::ApiRequest,
	store::{FileStore, SessionStore},
};

#[derive(Debug, Deserialize)]
struct Balance {
	balance: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	// Header `{}` and payload `{"exp":9999999999}`.
	let access = "e30.eyJleHAiOjk5OTk5OTk5OTl9.demo";

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).json_body(serde_json::json!({
				"access_token": access,
				"refresh_token": "demo-refresh",
				"office_name": "Treasury",
				"wallet_address": "0xfeedbeef",
				"token_type": "bearer",
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/balance/").header("authorization", format!("Bearer {access}"));
			then.status(200).json_body(serde_json::json!({ "balance": 1250.5 }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/logout");
			then.status(200).json_body(serde_json::json!({ "message": "Successfully logged out" }));
		})
		.await;

	let path = env::temp_dir().join(format!("session_roundtrip_{}.json", std::process::id()));
	let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(&path)?);
	let config = ClientConfig::builder(Url::parse(&server.base_url())?).build()?;
	let client = ReqwestSessionClient::new(config, store);
	let identity = client.login("Treasury", "hunter2").await?;

	println!("Signed in as {} ({}).", identity.office_name, identity.wallet_address);
	println!("Session persisted to {}.", path.display());

	let balance: Balance =
		client.authorized_json(ApiRequest::get("/balance/"), "Failed to fetch balance").await?;

	println!("Balance: {:.2}.", balance.balance);

	client.logout().await?;

	println!("Signed out; identity now {:?}.", client.current_identity().await?);

	std::fs::remove_file(&path)?;

	Ok(())
}
