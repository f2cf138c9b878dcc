use serde::Serialize;

/// Successful activation. Exactly one of the two name fields is set,
/// depending on whether the caller chose the name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateAccountResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    pub owner_public_key: String,
    pub active_public_key: String,
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub network: String,
}
