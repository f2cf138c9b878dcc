use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::action::Action;
use super::transaction::{PackedTransaction, Transaction, TransactionHeader};
use super::{ChainClient, ChainError, TransactOptions, TransactionReceipt};

/// `ChainClient` backed by a nodeos HTTP API. Signatures come from a
/// keosd-compatible wallet that holds the creator's key.
pub struct EosRpcClient {
    http: reqwest::Client,
    endpoint: String,
    signer_url: String,
    signing_key: String,
}

#[derive(Debug, Deserialize)]
struct ChainInfo {
    chain_id: String,
    head_block_num: u32,
}

#[derive(Debug, Deserialize)]
struct BlockInfo {
    id: String,
    block_num: u32,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct SignedTransaction {
    signatures: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PushResult {
    transaction_id: Option<String>,
}

/// Pull the human-readable cause out of a nodeos error body: the joined
/// `error.details[].message` lines, else the top-level `message`.
pub fn extract_rpc_error(body: &Value) -> String {
    let details: Vec<&str> = body
        .pointer("/error/details")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|d| d.get("message").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if !details.is_empty() {
        return details.join("\n");
    }

    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn is_unknown_account(detail: &str) -> bool {
    detail.to_ascii_lowercase().contains("unknown key")
}

impl EosRpcClient {
    pub fn new(
        endpoint: &str,
        signer_url: &str,
        signing_key: &str,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signer_url: signer_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, url: String, body: &Value) -> Result<T, ChainError> {
        tracing::debug!(url = %url, "rpc: POST");
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        let payload: Value = resp.json().await?;

        if !status.is_success() {
            let detail = extract_rpc_error(&payload);
            tracing::debug!(url = %url, status = status.as_u16(), detail = %detail, "rpc: error response");
            return Err(ChainError::Rpc(detail));
        }

        serde_json::from_value(payload)
            .map_err(|e| ChainError::InvalidResponse(format!("{url}: {e}")))
    }

    async fn chain<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, ChainError> {
        self.post(format!("{}/v1/chain/{method}", self.endpoint), body).await
    }

    async fn get_info(&self) -> Result<ChainInfo, ChainError> {
        self.chain("get_info", &json!({})).await
    }

    async fn sign(&self, transaction: &Transaction, chain_id: &str) -> Result<Vec<String>, ChainError> {
        let body = json!([transaction.to_wallet_json(), [self.signing_key], chain_id]);
        let signed: SignedTransaction = self
            .post(format!("{}/v1/wallet/sign_transaction", self.signer_url), &body)
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        if signed.signatures.is_empty() {
            return Err(ChainError::Signing("wallet returned no signatures".into()));
        }
        Ok(signed.signatures)
    }
}

#[async_trait]
impl ChainClient for EosRpcClient {
    async fn account_exists(&self, name: &str) -> Result<bool, ChainError> {
        match self
            .chain::<Value>("get_account", &json!({ "account_name": name }))
            .await
        {
            Ok(_) => Ok(true),
            Err(ChainError::Rpc(detail)) if is_unknown_account(&detail) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn submit_transaction(
        &self,
        actions: Vec<Action>,
        options: TransactOptions,
    ) -> Result<TransactionReceipt, ChainError> {
        let info = self.get_info().await?;
        let ref_num = info.head_block_num.saturating_sub(options.blocks_behind);
        let block: BlockInfo = self
            .chain("get_block", &json!({ "block_num_or_id": ref_num }))
            .await?;

        let header = TransactionHeader::from_reference_block(
            block.block_num,
            &block.id,
            &block.timestamp,
            options.expire_seconds,
        )?;
        let transaction = Transaction { header, actions };

        let signatures = self.sign(&transaction, &info.chain_id).await?;
        let body = serde_json::to_value(PackedTransaction::new(&transaction, signatures))
            .map_err(|e| ChainError::Codec(e.to_string()))?;
        let pushed: PushResult = self.chain("push_transaction", &body).await?;

        Ok(TransactionReceipt {
            transaction_id: pushed.transaction_id.unwrap_or_else(|| transaction.id()),
        })
    }

    async fn health_check(&self) -> Result<(), ChainError> {
        self.get_info().await.map(|_| ())
    }
}
