// self
use duo_connector::{
	_preludet::*,
	auth::Tier,
	clock::FixedClock,
	codec,
	error::{MalformedInputError, ProtocolViolationError},
	mac,
	web::{self, SignRequestError},
};

const USER: &str = "testuser";
const NOW: i64 = 1_000;

fn signed() -> String {
	web::sign_request(TEST_IKEY, TEST_SKEY, TEST_AKEY, USER, NOW)
		.expect("Fixture inputs should sign successfully.")
}

fn verify(response: &str, now: i64) -> Result<String> {
	web::verify_response(TEST_IKEY, TEST_SKEY, TEST_AKEY, response, now)
}

fn reseal(tag: &str, payload: &str, key: &str) -> String {
	let cookie = format!("{tag}|{}", codec::encode_standard(payload.as_bytes()));
	let signature =
		mac::hmac_sign_hex(key.as_bytes(), cookie.as_bytes()).expect("HMAC should succeed.");

	format!("{cookie}|{signature}")
}

#[test]
fn verifier_round_trip_returns_username() {
	let response = verifier_response(&signed(), TEST_SKEY);

	assert_eq!(verify(&response, NOW).expect("Fresh response should verify."), USER);
	assert_eq!(verify(&response, 1_299).expect("Response is live until 1300."), USER);
}

#[test]
fn service_tier_expires_after_five_minutes() {
	let response = verifier_response(&signed(), TEST_SKEY);
	let err = verify(&response, 1_300).expect_err("Response must expire at 1300.");

	assert!(matches!(err, Error::Expired { tier: Tier::Service, expires_at: 1_300 }));
	assert_eq!(
		err.to_string(),
		"The service transaction expired at 1300. Please check that the system time is correct."
	);
}

#[test]
fn clock_variants_agree_with_explicit_time() {
	let clock = FixedClock::at_unix(NOW);
	let signed = web::sign_request_with_clock(TEST_IKEY, TEST_SKEY, TEST_AKEY, USER, &clock)
		.expect("Clock-driven signing should succeed.");

	assert_eq!(signed, self::signed());

	let response = verifier_response(&signed, TEST_SKEY);

	assert_eq!(
		web::verify_response_with_clock(TEST_IKEY, TEST_SKEY, TEST_AKEY, &response, &clock)
			.expect("Clock-driven verification should succeed."),
		USER
	);
}

#[test]
fn any_signature_tampering_is_detected() {
	let response = verifier_response(&signed(), TEST_SKEY);
	let (service, application) = response.split_once(':').expect("Two tokens expected.");

	for (tier, token) in [(Tier::Service, service), (Tier::Application, application)] {
		let start = token.rfind('|').expect("Signature separator expected.") + 1;

		for i in start..token.len() {
			let mut bytes = token.as_bytes().to_vec();

			bytes[i] = if bytes[i] == b'0' { b'1' } else { b'0' };

			let tampered_token = String::from_utf8(bytes).expect("Hex stays ASCII.");
			let tampered = match tier {
				Tier::Service => format!("{tampered_token}:{application}"),
				Tier::Application => format!("{service}:{tampered_token}"),
			};

			assert!(
				matches!(
					verify(&tampered, NOW),
					Err(Error::ProtocolViolation(ProtocolViolationError::SignatureMismatch {
						tier: found
					})) if found == tier
				),
				"Tampering {tier} signature byte {i} must be detected."
			);
		}
	}
}

#[test]
fn echoing_the_request_is_rejected() {
	assert!(matches!(
		verify(&signed(), NOW),
		Err(Error::ProtocolViolation(ProtocolViolationError::TagMismatch {
			tier: Tier::Service,
			expected: "AUTH",
			..
		}))
	));
}

#[test]
fn foreign_integration_key_is_rejected() {
	let other_ikey = "98765432109876543210";
	let signed = web::sign_request(other_ikey, TEST_SKEY, TEST_AKEY, USER, NOW)
		.expect("Other integration key should sign.");
	let response = verifier_response(&signed, TEST_SKEY);

	assert!(matches!(
		verify(&response, NOW),
		Err(Error::ProtocolViolation(ProtocolViolationError::IntegrationKeyMismatch {
			tier: Tier::Service
		}))
	));
}

#[test]
fn tiers_must_name_the_same_user() {
	let service = reseal("AUTH", &format!("alice|{TEST_IKEY}|1300"), TEST_SKEY);
	let application = reseal("APP", &format!("bob|{TEST_IKEY}|4600"), TEST_AKEY);

	assert!(matches!(
		verify(&format!("{service}:{application}"), NOW),
		Err(Error::ProtocolViolation(ProtocolViolationError::UsernameMismatch))
	));
}

#[test]
fn structural_damage_is_reported() {
	assert!(matches!(
		verify("AUTH|a|b:APP|c|d:extra", NOW),
		Err(Error::ProtocolViolation(ProtocolViolationError::TokenCount { found: 3 }))
	));
	assert!(matches!(
		verify("AUTH|a:APP|c|d", NOW),
		Err(Error::ProtocolViolation(ProtocolViolationError::FieldCount {
			tier: Tier::Service,
			found: 2
		}))
	));

	let bad_b64 = "AUTH|@@@@";
	let signature =
		mac::hmac_sign_hex(TEST_SKEY.as_bytes(), bad_b64.as_bytes()).expect("HMAC should succeed.");
	let application = reseal("APP", &format!("{USER}|{TEST_IKEY}|4600"), TEST_AKEY);

	assert!(matches!(
		verify(&format!("{bad_b64}|{signature}:{application}"), NOW),
		Err(Error::MalformedInput(MalformedInputError::Codec(_)))
	));
}

#[test]
fn generation_errors_keep_legacy_sentinels() {
	let cases = [
		(
			("", TEST_IKEY, TEST_SKEY, TEST_AKEY),
			"ERR|The username passed to sign_request() is invalid.",
		),
		(
			(USER, "short", TEST_SKEY, TEST_AKEY),
			"ERR|The Duo integration key passed to sign_request() is invalid.",
		),
		(
			(USER, TEST_IKEY, "short", TEST_AKEY),
			"ERR|The Duo secret key passed to sign_request() is invalid.",
		),
		(
			(USER, TEST_IKEY, TEST_SKEY, "short"),
			"ERR|The application secret key passed to sign_request() must be at least 40 characters.",
		),
	];

	for ((user, ikey, skey, akey), sentinel) in cases {
		assert_eq!(web::sign_request_legacy(ikey, skey, akey, user, NOW), sentinel);
	}

	assert_eq!(
		web::sign_request(TEST_IKEY, TEST_SKEY, TEST_AKEY, "a|b", NOW),
		Err(SignRequestError::InvalidUsername)
	);
	assert!(
		!web::sign_request_legacy(TEST_IKEY, TEST_SKEY, TEST_AKEY, USER, NOW).starts_with("ERR|")
	);
}

#[test]
fn concrete_scenario() {
	let signed = web::sign_request(TEST_IKEY, TEST_SKEY, TEST_AKEY, "alice", NOW)
		.expect("Scenario inputs should sign.");
	let (service, application) = signed.split_once(':').expect("Two tokens expected.");

	assert_eq!(service, reseal("TX", &format!("alice|{TEST_IKEY}|1300"), TEST_SKEY));
	assert_eq!(application, reseal("APP", &format!("alice|{TEST_IKEY}|4600"), TEST_AKEY));

	let response = verifier_response(&signed, TEST_SKEY);

	assert_eq!(verify(&response, 1_001).expect("Scenario should verify at 1001."), "alice");
	assert!(matches!(verify(&response, 1_300), Err(Error::Expired { tier: Tier::Service, .. })));
	assert!(matches!(verify(&response, 5_000), Err(Error::Expired { tier: Tier::Service, .. })));
}
