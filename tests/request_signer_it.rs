// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use duo_connector::{
	_preludet::*,
	mac,
	request::{self, RequestSigner, SignatureVersion},
};

const DATE: &str = "Tue, 21 Aug 2012 17:29:18 +0000";

fn at_date() -> OffsetDateTime {
	OffsetDateTime::UNIX_EPOCH + Duration::seconds(1_345_570_158)
}

fn expected_authorization(ikey: &str, skey: &str, canon: &str) -> String {
	let signature =
		mac::hmac_sign_hex(skey.as_bytes(), canon.as_bytes()).expect("HMAC should succeed.");

	format!("Basic {}", STANDARD.encode(format!("{ikey}:{signature}")))
}

#[test]
fn v2_authorization_matches_independent_computation() {
	let params = [("username", "root"), ("realname", "First Last")];
	let headers = RequestSigner::new(TEST_ADMIN_IKEY, TEST_ADMIN_SKEY)
		.sign(
			"post",
			"API-xxxxxxxx.duosecurity.com",
			"/accounts/v1/account/list",
			params,
			at_date(),
		)
		.expect("V2 signing should succeed.");
	let canon = format!(
		"{DATE}\nPOST\napi-xxxxxxxx.duosecurity.com\n/accounts/v1/account/list\nrealname=First%20Last&username=root"
	);

	assert_eq!(
		headers.authorization,
		expected_authorization(TEST_ADMIN_IKEY, TEST_ADMIN_SKEY, &canon)
	);
	assert_eq!(headers.date.as_deref(), Some(DATE));
}

#[test]
fn v1_omits_the_date() {
	let headers = RequestSigner::new(TEST_ADMIN_IKEY, TEST_ADMIN_SKEY)
		.with_version(SignatureVersion::V1)
		.sign("GET", "api.example.com", "/admin/v1/users", [("username", "jane")], at_date())
		.expect("V1 signing should succeed.");

	let expected = expected_authorization(
		TEST_ADMIN_IKEY,
		TEST_ADMIN_SKEY,
		"GET\napi.example.com\n/admin/v1/users\nusername=jane",
	);

	assert_eq!(headers.authorization, expected);
	assert_eq!(headers.date, None);
	assert_eq!(headers.into_pairs(), vec![("Authorization".to_owned(), expected)]);
}

#[test]
fn parameter_order_does_not_change_the_signature() {
	let signer = RequestSigner::new(TEST_ADMIN_IKEY, TEST_ADMIN_SKEY);
	let forward = signer
		.sign("GET", "h", "/p", [("b", "2"), ("a", "1"), ("c", "é")], at_date())
		.expect("Signing should succeed.");
	let backward = signer
		.sign("GET", "h", "/p", [("c", "é"), ("a", "1"), ("b", "2")], at_date())
		.expect("Signing should succeed.");

	assert_eq!(forward, backward);
	assert_eq!(request::canonical_query_string([("c", "é"), ("a", "1")]), "a=1&c=%C3%A9");
}

#[test]
fn signer_debug_redacts_the_secret() {
	let rendered = format!("{:?}", RequestSigner::new(TEST_ADMIN_IKEY, TEST_ADMIN_SKEY));

	assert!(rendered.contains(TEST_ADMIN_IKEY));
	assert!(!rendered.contains(TEST_ADMIN_SKEY));
}
