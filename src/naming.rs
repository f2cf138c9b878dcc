use rand::rngs::OsRng;
use rand::Rng;

use crate::chain::{ChainClient, ChainError};

pub const ACCOUNT_SUFFIX: &str = ".phoenix";
pub const ACCOUNT_NAME_LEN: usize = 12;
pub const FREE_NAME_ATTEMPTS: usize = 10;

const PREFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz12345";
const GENERATED_PREFIX_LEN: usize = 4;

fn is_name_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '1'..='5')
}

/// True when `[a-z1-5]{1,4}\.phoenix` occurs anywhere in `name`.
///
/// Only one preceding character needs checking: any run of 1 to 4 name
/// characters ends with a single name character.
pub fn contains_name_pattern(name: &str) -> bool {
    name.match_indices(ACCOUNT_SUFFIX).any(|(idx, _)| {
        name[..idx]
            .chars()
            .next_back()
            .is_some_and(is_name_char)
    })
}

/// Length in UTF-16 code units, the unit clients count name length in.
pub fn name_length(name: &str) -> usize {
    name.encode_utf16().count()
}

/// A random candidate such as `k3az.phoenix`, drawn from the OS generator.
pub fn generate_candidate() -> String {
    let mut rng = OsRng;
    let mut name = String::with_capacity(GENERATED_PREFIX_LEN + ACCOUNT_SUFFIX.len());
    for _ in 0..GENERATED_PREFIX_LEN {
        let idx = rng.gen_range(0..PREFIX_ALPHABET.len());
        name.push(PREFIX_ALPHABET[idx] as char);
    }
    name.push_str(ACCOUNT_SUFFIX);
    name
}

#[derive(Debug)]
pub enum FreeNameError {
    /// Every candidate was already taken.
    Exhausted,
    Lookup(ChainError),
}

/// Probe random candidates until one does not exist on chain.
pub async fn resolve_free_name(
    chain: &dyn ChainClient,
    attempts: usize,
) -> Result<String, FreeNameError> {
    for attempt in 1..=attempts {
        let candidate = generate_candidate();
        tracing::debug!(attempt, candidate = %candidate, "Probing candidate account name");

        let exists = chain
            .account_exists(&candidate)
            .await
            .map_err(FreeNameError::Lookup)?;
        if !exists {
            return Ok(candidate);
        }
    }

    tracing::warn!(attempts, "Could not find a free account name");
    Err(FreeNameError::Exhausted)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chain::action::Action;
    use crate::chain::{TransactOptions, TransactionReceipt};

    /// Reports the first `taken` probes as existing accounts.
    struct TakenChain {
        taken: usize,
        probes: AtomicUsize,
    }

    #[async_trait]
    impl ChainClient for TakenChain {
        async fn account_exists(&self, _name: &str) -> Result<bool, ChainError> {
            let n = self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(n < self.taken)
        }

        async fn submit_transaction(
            &self,
            _actions: Vec<Action>,
            _options: TransactOptions,
        ) -> Result<TransactionReceipt, ChainError> {
            unreachable!("name resolution never submits")
        }

        async fn health_check(&self) -> Result<(), ChainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_resolve_exhausts_after_all_attempts() {
        let chain = TakenChain {
            taken: usize::MAX,
            probes: AtomicUsize::new(0),
        };
        let result = resolve_free_name(&chain, FREE_NAME_ATTEMPTS).await;
        assert!(matches!(result, Err(FreeNameError::Exhausted)));
        assert_eq!(chain.probes.load(Ordering::SeqCst), FREE_NAME_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_resolve_returns_first_free_candidate() {
        let chain = TakenChain {
            taken: 3,
            probes: AtomicUsize::new(0),
        };
        let name = resolve_free_name(&chain, FREE_NAME_ATTEMPTS).await.unwrap();
        assert!(name.ends_with(ACCOUNT_SUFFIX));
        assert_eq!(chain.probes.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_pattern_matches_anywhere() {
        assert!(contains_name_pattern("abcd.phoenix"));
        assert!(contains_name_pattern("a.phoenix"));
        assert!(contains_name_pattern("abcdefgh.phoenix"));
        assert!(contains_name_pattern("x.phoenix.extra"));
    }

    #[test]
    fn test_pattern_rejects() {
        assert!(!contains_name_pattern("test"));
        assert!(!contains_name_pattern(".phoenix"));
        assert!(!contains_name_pattern("ABCD.phoenix"));
        assert!(!contains_name_pattern("abc6.phoenix"));
        assert!(!contains_name_pattern("abc..phoenix"));
    }

    #[test]
    fn test_generated_candidates_are_well_formed() {
        for _ in 0..200 {
            let name = generate_candidate();
            assert_eq!(name_length(&name), ACCOUNT_NAME_LEN);
            assert!(name.ends_with(ACCOUNT_SUFFIX));
            assert!(contains_name_pattern(&name));
            assert!(name[..4].chars().all(is_name_char));
            assert!(name.parse::<crate::chain::name::Name>().is_ok());
        }
    }

    #[test]
    fn test_name_length_counts_utf16_units() {
        assert_eq!(name_length("abcd.phoenix"), 12);
        assert_eq!(name_length("é"), 1);
        assert_eq!(name_length("😀"), 2);
    }
}
