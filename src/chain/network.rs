use std::fmt;
use std::str::FromStr;

use super::action::Symbol;

/// Networks the service knows how to create accounts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Wax,
    WaxTest,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Wax, Network::WaxTest];

    pub fn name(self) -> &'static str {
        match self {
            Network::Wax => "wax",
            Network::WaxTest => "waxtest",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Network::Wax => "https://api-wax.maltablock.org",
            Network::WaxTest => "https://waxtestnet.greymass.com",
        }
    }

    /// Environment variable overriding the RPC endpoint, e.g. `WAX_ENDPOINT`.
    pub fn endpoint_var(self) -> String {
        format!("{}_ENDPOINT", self.name().to_uppercase())
    }

    /// Environment variable holding the creator account, e.g. `WAX_ACCOUNT`.
    pub fn account_var(self) -> String {
        format!("{}_ACCOUNT", self.name().to_uppercase())
    }

    pub fn core_symbol(self) -> Symbol {
        Symbol {
            code: "WAX",
            precision: 8,
        }
    }

    pub fn explorer_transaction_url(self, transaction_id: &str) -> String {
        let subdomain = match self {
            Network::Wax => "wax",
            Network::WaxTest => "wax-test",
        };
        format!("https://{subdomain}.bloks.io/transaction/{transaction_id}")
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("network \"{s}\" not supported"))
    }
}
