pub mod action;
pub mod keys;
pub mod name;
pub mod network;
pub mod rpc;
pub mod transaction;

use std::fmt;

use async_trait::async_trait;

use action::Action;

/// Reference-block and expiration settings for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactOptions {
    pub blocks_behind: u32,
    pub expire_seconds: u32,
}

impl Default for TransactOptions {
    fn default() -> Self {
        Self {
            blocks_behind: 3,
            expire_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_id: String,
}

#[derive(Debug)]
pub enum ChainError {
    Transport(reqwest::Error),
    /// The node answered with an error; holds the extracted detail text.
    Rpc(String),
    Signing(String),
    InvalidResponse(String),
    Codec(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Transport(e) => write!(f, "transport error: {e}"),
            ChainError::Rpc(msg) => write!(f, "rpc error: {msg}"),
            ChainError::Signing(msg) => write!(f, "signing error: {msg}"),
            ChainError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            ChainError::Codec(msg) => write!(f, "codec error: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<reqwest::Error> for ChainError {
    fn from(e: reqwest::Error) -> Self {
        ChainError::Transport(e)
    }
}

/// The blockchain network as seen by the activation handler.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// `Ok(false)` when the node reports the account as unknown; any other
    /// lookup failure is an error.
    async fn account_exists(&self, name: &str) -> Result<bool, ChainError>;

    async fn submit_transaction(
        &self,
        actions: Vec<Action>,
        options: TransactOptions,
    ) -> Result<TransactionReceipt, ChainError>;

    async fn health_check(&self) -> Result<(), ChainError>;
}
