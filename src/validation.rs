use std::str::FromStr;

use serde_json::{Map, Value};

use crate::chain::keys::is_valid_public_key;
use crate::middleware::rate_limit::RateLimiter;
use crate::models::api_error::ApiError;
use crate::naming::{contains_name_pattern, name_length, ACCOUNT_NAME_LEN, ACCOUNT_SUFFIX};

pub const REQUESTED_ACCOUNT_NAME: &str = "requestedAccountName";
pub const OWNER_PUBLIC_KEY: &str = "ownerPublicKey";
pub const ACTIVE_PUBLIC_KEY: &str = "activePublicKey";

/// Whether the caller picks the account name or the server does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    RequestedName,
    GeneratedName,
}

impl EndpointMode {
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EndpointMode::RequestedName => {
                &[REQUESTED_ACCOUNT_NAME, OWNER_PUBLIC_KEY, ACTIVE_PUBLIC_KEY]
            }
            EndpointMode::GeneratedName => &[OWNER_PUBLIC_KEY, ACTIVE_PUBLIC_KEY],
        }
    }
}

impl FromStr for EndpointMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requested" => Ok(EndpointMode::RequestedName),
            "generated" => Ok(EndpointMode::GeneratedName),
            other => Err(format!("unknown endpoint mode \"{other}\"")),
        }
    }
}

/// A request body that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub requested_account_name: Option<String>,
    pub owner_public_key: String,
    pub active_public_key: String,
}

/// Decode the raw body; anything that is not JSON counts as missing.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

fn non_empty_str<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn check_account_name(value: &str, errors: &mut Vec<ApiError>) {
    if name_length(value) != ACCOUNT_NAME_LEN {
        errors.push(ApiError::new(
            "InvalidAccountNameFormat",
            format!(
                "The requested account name '{value}' is not 12 characters long. \
                 This server is not prepared to handle bidding on account names shorter than \
                 12 characters for the EOS network."
            ),
        ));
    }
    if !value.ends_with(ACCOUNT_SUFFIX) {
        errors.push(ApiError::new(
            "InvalidAccountNameFormat",
            format!(
                "The requested account name '{value}' does not end with '.phoenix'. \
                 All free WAX accounts must have the '.phoenix' suffix."
            ),
        ));
    }
    if !contains_name_pattern(value) {
        errors.push(ApiError::new(
            "InvalidAccountNameFormat",
            format!("The requested account name '{value}' is invalid."),
        ));
    }
}

fn check_public_key(value: &str, errors: &mut Vec<ApiError>) {
    if !is_valid_public_key(value) {
        errors.push(ApiError::new(
            "InvalidEosKeyFormat",
            format!("The key provided '{value}' appears to be invalid."),
        ));
    }
}

/// Shape and field rules. Every violation is reported, none short-circuits
/// the others.
pub fn validate_body(mode: EndpointMode, body: Option<&Value>, errors: &mut Vec<ApiError>) {
    let Some(body) = body.and_then(Value::as_object) else {
        errors.push(ApiError::new(
            "Invalid_POST_Body",
            "No parameters were detected in the incoming body.",
        ));
        return;
    };

    if mode == EndpointMode::GeneratedName
        && body.get(REQUESTED_ACCOUNT_NAME).is_some_and(Value::is_string)
    {
        errors.push(ApiError::new(
            "Invalid_POST_Body",
            "The 'requestedAccountName' parameter is not available on this endpoint. \
             A free account name will be chosen instead.",
        ));
    }

    for &field in mode.required_fields() {
        let Some(value) = non_empty_str(body, field) else {
            errors.push(ApiError::new(
                format!("Invalid_{field}"),
                format!("{field} is NOT defined as a string in the incoming body."),
            ));
            continue;
        };

        match field {
            REQUESTED_ACCOUNT_NAME => check_account_name(value, errors),
            _ => check_public_key(value, errors),
        }
    }
}

/// Public keys the rate limiter should consider: whichever of the two are strings.
pub fn rate_limit_keys(body: Option<&Value>) -> Vec<String> {
    let Some(body) = body.and_then(Value::as_object) else {
        return Vec::new();
    };
    [OWNER_PUBLIC_KEY, ACTIVE_PUBLIC_KEY]
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

pub async fn check_rate_limit(
    limiter: &RateLimiter,
    ips: &[String],
    keys: &[String],
    errors: &mut Vec<ApiError>,
) {
    if let Err(violation) = limiter.check(ips, keys).await {
        errors.push(ApiError::new("RateLimited", violation.to_string()));
    }
}

/// Run every rule group and either return the typed request or all errors.
pub async fn validate_request(
    mode: EndpointMode,
    body: Option<&Value>,
    ips: &[String],
    limiter: &RateLimiter,
) -> Result<ValidatedRequest, Vec<ApiError>> {
    let mut errors = Vec::new();

    validate_body(mode, body, &mut errors);
    check_rate_limit(limiter, ips, &rate_limit_keys(body), &mut errors).await;

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every required field was checked to be a non-empty string above.
    let fields = body.and_then(Value::as_object);
    let field = |name: &str| {
        fields
            .and_then(|b| non_empty_str(b, name))
            .unwrap_or_default()
            .to_string()
    };

    Ok(ValidatedRequest {
        requested_account_name: match mode {
            EndpointMode::RequestedName => Some(field(REQUESTED_ACCOUNT_NAME)),
            EndpointMode::GeneratedName => None,
        },
        owner_public_key: field(OWNER_PUBLIC_KEY),
        active_public_key: field(ACTIVE_PUBLIC_KEY),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const OWNER: &str = "EOS8DnoFK9D9HgAMdVocM58woFwWQZJe5L6PAYVQEQTH1xwWJ1Esr";
    const ACTIVE: &str = "EOS6D8ANTQCgpmtK4qPD8MwCqATade3y8Lcq8EWcEWthPoYV7sTxV";

    fn body_errors(mode: EndpointMode, body: Value) -> Vec<ApiError> {
        let mut errors = Vec::new();
        validate_body(mode, Some(&body), &mut errors);
        errors
    }

    fn codes(errors: &[ApiError]) -> Vec<&str> {
        errors.iter().map(|e| e.error_code.as_str()).collect()
    }

    #[test]
    fn test_missing_body_reported_once() {
        let mut errors = Vec::new();
        validate_body(EndpointMode::RequestedName, None, &mut errors);
        assert_eq!(codes(&errors), ["Invalid_POST_Body"]);

        let errors = body_errors(EndpointMode::GeneratedName, json!(["not", "an", "object"]));
        assert_eq!(codes(&errors), ["Invalid_POST_Body"]);
        assert_eq!(errors[0].message, "No parameters were detected in the incoming body.");
    }

    #[test]
    fn test_missing_keys_reported_per_field() {
        let errors = body_errors(EndpointMode::GeneratedName, json!({}));
        assert_eq!(codes(&errors), ["Invalid_ownerPublicKey", "Invalid_activePublicKey"]);
        assert_eq!(
            errors[0].message,
            "ownerPublicKey is NOT defined as a string in the incoming body."
        );
    }

    #[test]
    fn test_non_string_and_empty_fields() {
        let errors = body_errors(
            EndpointMode::GeneratedName,
            json!({ "ownerPublicKey": 42, "activePublicKey": "" }),
        );
        assert_eq!(codes(&errors), ["Invalid_ownerPublicKey", "Invalid_activePublicKey"]);
    }

    #[test]
    fn test_short_name_fires_all_three_name_rules() {
        let errors = body_errors(
            EndpointMode::RequestedName,
            json!({ "requestedAccountName": "test", "ownerPublicKey": OWNER, "activePublicKey": ACTIVE }),
        );
        assert_eq!(
            codes(&errors),
            ["InvalidAccountNameFormat", "InvalidAccountNameFormat", "InvalidAccountNameFormat"]
        );
        assert!(errors[0].message.contains("is not 12 characters long"));
        assert!(errors[1].message.contains("does not end with '.phoenix'"));
        assert!(errors[2].message.ends_with("is invalid."));
    }

    #[test]
    fn test_good_name_with_truncated_keys() {
        let errors = body_errors(
            EndpointMode::RequestedName,
            json!({
                "requestedAccountName": "abcd.phoenix",
                "ownerPublicKey": &OWNER[..OWNER.len() - 1],
                "activePublicKey": &ACTIVE[..ACTIVE.len() - 1],
            }),
        );
        assert_eq!(codes(&errors), ["InvalidEosKeyFormat", "InvalidEosKeyFormat"]);
        assert!(errors[0].message.contains("appears to be invalid"));
    }

    #[test]
    fn test_generated_mode_rejects_requested_name() {
        let errors = body_errors(
            EndpointMode::GeneratedName,
            json!({ "requestedAccountName": "test", "ownerPublicKey": OWNER, "activePublicKey": ACTIVE }),
        );
        assert_eq!(codes(&errors), ["Invalid_POST_Body"]);
        assert!(errors[0]
            .message
            .to_lowercase()
            .contains("parameter is not available"));
    }

    #[test]
    fn test_generated_mode_ignores_non_string_requested_name() {
        let errors = body_errors(
            EndpointMode::GeneratedName,
            json!({ "requestedAccountName": 7, "ownerPublicKey": OWNER, "activePublicKey": ACTIVE }),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_rate_limit_keys_only_strings() {
        let body = json!({ "ownerPublicKey": OWNER, "activePublicKey": 1 });
        assert_eq!(rate_limit_keys(Some(&body)), vec![OWNER.to_string()]);
        assert!(rate_limit_keys(None).is_empty());
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(b"").is_none());
        assert!(parse_body(b"{not json").is_none());
        assert!(parse_body(br#"{"a":1}"#).is_some());
    }

    #[test]
    fn test_endpoint_mode_parse() {
        assert_eq!("Requested".parse::<EndpointMode>(), Ok(EndpointMode::RequestedName));
        assert_eq!("generated".parse::<EndpointMode>(), Ok(EndpointMode::GeneratedName));
        assert!("free".parse::<EndpointMode>().is_err());
    }

    #[tokio::test]
    async fn test_rate_limited_request_collects_error() {
        let limiter = RateLimiter::default();
        let ips = vec!["203.0.113.7".to_string()];
        limiter.record(&ips, &[]).await;

        let body = json!({ "ownerPublicKey": OWNER, "activePublicKey": ACTIVE });
        let errors = validate_request(EndpointMode::GeneratedName, Some(&body), &ips, &limiter)
            .await
            .unwrap_err();
        assert_eq!(codes(&errors), ["RateLimited"]);
        assert_eq!(
            errors[0].message,
            "It appears that you have already created a free WAX account."
        );
    }

    #[tokio::test]
    async fn test_valid_request_is_typed() {
        let limiter = RateLimiter::default();
        let body = json!({ "requestedAccountName": "abcd.phoenix", "ownerPublicKey": OWNER, "activePublicKey": ACTIVE });
        let request = validate_request(EndpointMode::RequestedName, Some(&body), &[], &limiter)
            .await
            .unwrap();
        assert_eq!(request.requested_account_name.as_deref(), Some("abcd.phoenix"));
        assert_eq!(request.owner_public_key, OWNER);
        assert_eq!(request.active_public_key, ACTIVE);
    }
}
