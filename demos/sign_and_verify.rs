//! Demonstrates a full round trip: issue a signed request, re-sign the service tier the way the
//! Duo verifier does, and verify the response.

// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use duo_connector::{
	auth::{ApplicationKey, IntegrationKey, SecretKey, Tier},
	config::ConnectorConfig,
	connector::Connector,
	http::ReqwestAdminTransport,
	mac,
};

/// Keeps the service payload, tags it `AUTH`, and signs it with the shared secret key.
fn simulate_verifier(signed: &str, skey: &SecretKey) -> Result<String> {
	let (service, application) =
		signed.split_once(':').ok_or_else(|| eyre!("Signed request must carry two tokens."))?;
	let payload =
		service.split('|').nth(1).ok_or_else(|| eyre!("Service token must carry a payload."))?;
	let cookie = format!("{}|{payload}", Tier::Service.verify_tag());
	let signature = mac::hmac_sign_hex(skey.expose().as_bytes(), cookie.as_bytes())?;

	Ok(format!("{cookie}|{signature}:{application}"))
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let skey = SecretKey::new("ssssssssssssssssssssssssssssssssssssssss")?;
	let config = ConnectorConfig::new(
		"api-xxxxxxxx.duosecurity.com",
		IntegrationKey::new("DIXXXXXXXXXXXXXXXXXX")?,
		skey.clone(),
		ApplicationKey::generate(),
	);
	let connector = <Connector<ReqwestAdminTransport>>::new(config)?;
	let signed = connector.sign_request("jane")?;

	println!("Signed request: {signed}");

	let response = simulate_verifier(&signed, &skey)?;

	println!("Verifier response: {response}");
	println!("Authenticated user: {}", connector.verify_response(&response)?);

	Ok(())
}
