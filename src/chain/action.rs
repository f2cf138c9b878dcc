use std::fmt;

use super::keys::PublicKey;
use super::name::Name;
use super::transaction::{write_varuint32, Pack};

pub const SYSTEM_CONTRACT: Name = Name::from_raw(6138663577826885632); // eosio
const NEWACCOUNT: Name = Name::from_raw(11148770977341390848);
const BUYRAMBYTES: Name = Name::from_raw(4520896358299381760);
const DELEGATEBW: Name = Name::from_raw(5378043540636893184);

/// RAM purchased for every new account.
pub const RAM_BYTES: u32 = 6144;
/// Stake delegated to every new account, in the smallest unit of the core symbol.
pub const CPU_STAKE: i64 = 90_000_000;
pub const NET_STAKE: i64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub code: &'static str,
    pub precision: u8,
}

impl Symbol {
    fn raw(self) -> u64 {
        let mut value = self.precision as u64;
        for (i, b) in self.code.bytes().take(7).enumerate() {
            value |= (b as u64) << (8 * (i + 1));
        }
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10i64.pow(self.symbol.precision as u32);
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let whole = abs / scale as u64;
        let frac = abs % scale as u64;
        if self.symbol.precision == 0 {
            write!(f, "{sign}{whole} {}", self.symbol.code)
        } else {
            write!(
                f,
                "{sign}{whole}.{frac:0width$} {}",
                self.symbol.code,
                width = self.symbol.precision as usize
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyWeight {
    pub key: PublicKey,
    pub weight: u16,
}

/// Authority with a single key; the new account gets no nested accounts or waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
}

impl Authority {
    pub fn single_key(key: PublicKey) -> Self {
        Self {
            threshold: 1,
            keys: vec![KeyWeight { key, weight: 1 }],
        }
    }
}

impl Pack for Authority {
    fn pack(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.threshold.to_le_bytes());
        write_varuint32(out, self.keys.len() as u32);
        for kw in &self.keys {
            kw.key.pack(out);
            out.extend_from_slice(&kw.weight.to_le_bytes());
        }
        write_varuint32(out, 0); // accounts
        write_varuint32(out, 0); // waits
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionData {
    NewAccount {
        creator: Name,
        name: Name,
        owner: Authority,
        active: Authority,
    },
    BuyRamBytes {
        payer: Name,
        receiver: Name,
        bytes: u32,
    },
    DelegateBw {
        from: Name,
        receiver: Name,
        stake_net_quantity: Asset,
        stake_cpu_quantity: Asset,
        transfer: bool,
    },
}

impl ActionData {
    pub fn action_name(&self) -> Name {
        match self {
            ActionData::NewAccount { .. } => NEWACCOUNT,
            ActionData::BuyRamBytes { .. } => BUYRAMBYTES,
            ActionData::DelegateBw { .. } => DELEGATEBW,
        }
    }
}

impl Pack for Name {
    fn pack(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value().to_le_bytes());
    }
}

impl Pack for Asset {
    fn pack(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.symbol.raw().to_le_bytes());
    }
}

impl Pack for ActionData {
    fn pack(&self, out: &mut Vec<u8>) {
        match self {
            ActionData::NewAccount {
                creator,
                name,
                owner,
                active,
            } => {
                creator.pack(out);
                name.pack(out);
                owner.pack(out);
                active.pack(out);
            }
            ActionData::BuyRamBytes {
                payer,
                receiver,
                bytes,
            } => {
                payer.pack(out);
                receiver.pack(out);
                out.extend_from_slice(&bytes.to_le_bytes());
            }
            ActionData::DelegateBw {
                from,
                receiver,
                stake_net_quantity,
                stake_cpu_quantity,
                transfer,
            } => {
                from.pack(out);
                receiver.pack(out);
                stake_net_quantity.pack(out);
                stake_cpu_quantity.pack(out);
                out.push(u8::from(*transfer));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub account: Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: ActionData,
}

impl Action {
    pub fn name(&self) -> Name {
        self.data.action_name()
    }

    pub fn packed_data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.data.pack(&mut out);
        out
    }
}

impl Pack for Action {
    fn pack(&self, out: &mut Vec<u8>) {
        self.account.pack(out);
        self.name().pack(out);
        write_varuint32(out, self.authorization.len() as u32);
        for level in &self.authorization {
            level.actor.pack(out);
            level.permission.pack(out);
        }
        let data = self.packed_data();
        write_varuint32(out, data.len() as u32);
        out.extend_from_slice(&data);
    }
}

/// The three system actions that create, fund and stake a new account.
pub fn account_creation_actions(
    creator: Name,
    permission: Name,
    account: Name,
    owner: PublicKey,
    active: PublicKey,
    core_symbol: Symbol,
) -> Vec<Action> {
    let authorization = vec![PermissionLevel {
        actor: creator,
        permission,
    }];
    let action = |data| Action {
        account: SYSTEM_CONTRACT,
        authorization: authorization.clone(),
        data,
    };

    vec![
        action(ActionData::NewAccount {
            creator,
            name: account,
            owner: Authority::single_key(owner),
            active: Authority::single_key(active),
        }),
        action(ActionData::BuyRamBytes {
            payer: creator,
            receiver: account,
            bytes: RAM_BYTES,
        }),
        action(ActionData::DelegateBw {
            from: creator,
            receiver: account,
            stake_net_quantity: Asset {
                amount: NET_STAKE,
                symbol: core_symbol,
            },
            stake_cpu_quantity: Asset {
                amount: CPU_STAKE,
                symbol: core_symbol,
            },
            transfer: true,
        }),
    ]
}
