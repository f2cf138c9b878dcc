use axum::{body::Bytes, extract::State, response::IntoResponse, Extension, Json};

use crate::chain::action::account_creation_actions;
use crate::chain::keys::PublicKey;
use crate::chain::name::Name;
use crate::chain::TransactOptions;
use crate::error::AppError;
use crate::middleware::client_ip::ClientIps;
use crate::models::account::ActivateAccountResponse;
use crate::naming::{resolve_free_name, FreeNameError, FREE_NAME_ATTEMPTS};
use crate::validation::{parse_body, validate_request};
use crate::AppState;

/// POST /api/v1/activateAccount
///
/// The rate limit is only charged once the transaction has been accepted.
pub async fn activate_account(
    State(state): State<AppState>,
    Extension(ClientIps(ips)): Extension<ClientIps>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "activate_account",
        mode = ?state.endpoint_mode,
        body_bytes = body.len(),
        "Handler: POST /api/v1/activateAccount"
    );

    let body = parse_body(&body);
    let request = validate_request(state.endpoint_mode, body.as_ref(), &ips, &state.rate_limiter)
        .await?;

    let chosen_by_caller = request.requested_account_name.is_some();
    let account_name = match request.requested_account_name {
        Some(name) => {
            // Names outside the on-chain charset can never be looked up.
            name.parse::<Name>().map_err(AppError::AvailabilityCheck)?;
            tracing::debug!(handler = "activate_account", account_name = %name, "Dispatching to chain.account_exists");
            match state.chain.account_exists(&name).await {
                Ok(false) => name,
                Ok(true) => return Err(AppError::AccountNameTaken(name)),
                Err(e) => return Err(AppError::AvailabilityCheck(e)),
            }
        }
        None => {
            tracing::debug!(handler = "activate_account", "Resolving a free account name");
            resolve_free_name(state.chain.as_ref(), FREE_NAME_ATTEMPTS)
                .await
                .map_err(|e| match e {
                    FreeNameError::Exhausted => AppError::NoFreeAccountName,
                    FreeNameError::Lookup(e) => AppError::AvailabilityCheck(e),
                })?
        }
    };

    let account: Name = account_name.parse().map_err(AppError::Creation)?;
    let owner: PublicKey = request.owner_public_key.parse().map_err(AppError::Creation)?;
    let active: PublicKey = request.active_public_key.parse().map_err(AppError::Creation)?;
    let actions = account_creation_actions(
        state.creator,
        state.permission,
        account,
        owner,
        active,
        state.network.core_symbol(),
    );

    tracing::debug!(
        handler = "activate_account",
        account_name = %account_name,
        actions = actions.len(),
        "Dispatching to chain.submit_transaction"
    );
    let receipt = state
        .chain
        .submit_transaction(actions, TransactOptions::default())
        .await
        .map_err(AppError::Creation)?;

    let keys = [
        request.owner_public_key.clone(),
        request.active_public_key.clone(),
    ];
    state.rate_limiter.record(&ips, &keys).await;

    tracing::info!(
        handler = "activate_account",
        account_name = %account_name,
        transaction_id = %receipt.transaction_id,
        explorer = %state.network.explorer_transaction_url(&receipt.transaction_id),
        status = 200,
        "Responding: account created"
    );

    let (requested_account_name, generated_name) = if chosen_by_caller {
        (Some(account_name), None)
    } else {
        (None, Some(account_name))
    };

    Ok(Json(ActivateAccountResponse {
        requested_account_name,
        account_name: generated_name,
        owner_public_key: request.owner_public_key,
        active_public_key: request.active_public_key,
        transaction_id: receipt.transaction_id,
    }))
}
