//! Watch-only address derivation from an extended public key.
//!
//! An account-level extended public key (`xpub`, `ypub`, `zpub` and their
//! testnet counterparts) is derived along the non-hardened path
//! `<key>/<chain>/<index>`, where chain 0 holds receiving addresses and chain 1
//! holds change addresses. The version prefix of the key decides both the
//! network and the address encoding:
//!
//! | Prefix | Network | Address |
//! |--------|---------|---------|
//! | `xpub` / `tpub` | mainnet / testnet | P2PKH (`1...`, `m...`) |
//! | `ypub` / `upub` | mainnet / testnet | P2SH-P2WPKH (`3...`, `2...`) |
//! | `zpub` / `vpub` | mainnet / testnet | P2WPKH (`bc1q...`, `tb1q...`) |
//!
//! Everything here is pure: no I/O, no private key material.
//!
//! ```
//! use ratiobook::wallet::{self, ExtendedPublicKey};
//!
//! let key: ExtendedPublicKey = "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs"
//!     .parse()
//!     .unwrap();
//! let receive = wallet::derive(&key, 0, 2).unwrap();
//! assert_eq!(receive[0].address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
//! ```
//!
//! Gap-limit scanning (stop after N consecutive unused addresses) is not done
//! here. Callers scan a fixed discovery limit per chain.

use std::fmt;
use std::str::FromStr;

use bitcoin::base58;
use bitcoin::bip32::{ChildNumber, Xpub};
use bitcoin::secp256k1::{Secp256k1, VerifyOnly};
use bitcoin::{Address, CompressedPublicKey, Network};

use crate::error::WalletError;

/// Serialized length of an extended key without the checksum.
const EXTENDED_KEY_LEN: usize = 78;

const XPUB_MAINNET: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const YPUB_MAINNET: [u8; 4] = [0x04, 0x9D, 0x7C, 0xB2];
const ZPUB_MAINNET: [u8; 4] = [0x04, 0xB2, 0x47, 0x46];
const TPUB_TESTNET: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];
const UPUB_TESTNET: [u8; 4] = [0x04, 0x4A, 0x52, 0x62];
const VPUB_TESTNET: [u8; 4] = [0x04, 0x5F, 0x1C, 0xF6];

/// Address subtree under an account key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Chain {
    /// Externally visible receiving addresses (`.../0/i`).
    Receive,
    /// Internal change addresses (`.../1/i`).
    Change,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Receive, Chain::Change];

    /// The chain selector used in the derivation path.
    pub fn selector(self) -> u32 {
        match self {
            Chain::Receive => 0,
            Chain::Change => 1,
        }
    }
}

impl TryFrom<u32> for Chain {
    type Error = WalletError;

    fn try_from(selector: u32) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Chain::Receive),
            1 => Ok(Chain::Change),
            other => Err(WalletError::InvalidChainSelector(other)),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Receive => write!(f, "receive"),
            Chain::Change => write!(f, "change"),
        }
    }
}

/// Address encoding implied by the key version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressKind {
    P2pkh,
    P2shP2wpkh,
    P2wpkh,
}

/// One derived address.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedAddress {
    pub chain: Chain,
    pub index: u32,
    pub address: String,
}

/// A parsed account-level extended public key.
///
/// Holds only public key material; cannot sign anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    xpub: Xpub,
    version: [u8; 4],
    network: Network,
    kind: AddressKind,
}

impl ExtendedPublicKey {
    /// Network the key belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Address encoding used for derived addresses.
    pub fn address_kind(&self) -> AddressKind {
        self.kind
    }

    /// Human-readable prefix of the original key (`zpub`, `ypub`, ...).
    pub fn prefix(&self) -> &'static str {
        match self.version {
            XPUB_MAINNET => "xpub",
            YPUB_MAINNET => "ypub",
            ZPUB_MAINNET => "zpub",
            TPUB_TESTNET => "tpub",
            UPUB_TESTNET => "upub",
            _ => "vpub",
        }
    }

    /// Derive the address at `chain/index`.
    pub fn derive_address(&self, chain: Chain, index: u32) -> Result<DerivedAddress, WalletError> {
        let secp = Secp256k1::verification_only();
        let chain_key = self.chain_key(&secp, chain)?;
        self.address_at(&secp, &chain_key, chain, index)
    }

    fn chain_key(&self, secp: &Secp256k1<VerifyOnly>, chain: Chain) -> Result<Xpub, WalletError> {
        let child = ChildNumber::from_normal_idx(chain.selector())
            .map_err(|e| WalletError::Derivation(e.to_string()))?;
        self.xpub
            .ckd_pub(secp, child)
            .map_err(|e| WalletError::Derivation(e.to_string()))
    }

    fn address_at(
        &self,
        secp: &Secp256k1<VerifyOnly>,
        chain_key: &Xpub,
        chain: Chain,
        index: u32,
    ) -> Result<DerivedAddress, WalletError> {
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| WalletError::Derivation(format!("index {index}: {e}")))?;
        let key = chain_key
            .ckd_pub(secp, child)
            .map_err(|e| WalletError::Derivation(format!("index {index}: {e}")))?;
        let pubkey = CompressedPublicKey(key.public_key);

        let address = match self.kind {
            AddressKind::P2pkh => Address::p2pkh(pubkey.pubkey_hash(), self.network),
            AddressKind::P2shP2wpkh => Address::p2shwpkh(&pubkey, self.network),
            AddressKind::P2wpkh => Address::p2wpkh(&pubkey, self.network),
        };

        Ok(DerivedAddress {
            chain,
            index,
            address: address.to_string(),
        })
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut data =
            base58::decode_check(s.trim()).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        if data.len() != EXTENDED_KEY_LEN {
            return Err(WalletError::InvalidKey(format!(
                "expected {EXTENDED_KEY_LEN} bytes, got {}",
                data.len()
            )));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[..4]);
        let (network, kind) = classify(version).ok_or(WalletError::UnknownVersion(version))?;

        // The bip32 decoder only understands the xpub/tpub versions.
        let canonical = if network == Network::Bitcoin {
            XPUB_MAINNET
        } else {
            TPUB_TESTNET
        };
        data[..4].copy_from_slice(&canonical);
        let xpub = Xpub::decode(&data).map_err(|e| WalletError::InvalidKey(e.to_string()))?;

        Ok(Self {
            xpub,
            version,
            network,
            kind,
        })
    }
}

impl fmt::Display for ExtendedPublicKey {
    /// Shows the prefix and fingerprint only, so logs do not carry the full key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.prefix(), self.xpub.fingerprint())
    }
}

fn classify(version: [u8; 4]) -> Option<(Network, AddressKind)> {
    match version {
        XPUB_MAINNET => Some((Network::Bitcoin, AddressKind::P2pkh)),
        YPUB_MAINNET => Some((Network::Bitcoin, AddressKind::P2shP2wpkh)),
        ZPUB_MAINNET => Some((Network::Bitcoin, AddressKind::P2wpkh)),
        TPUB_TESTNET => Some((Network::Testnet, AddressKind::P2pkh)),
        UPUB_TESTNET => Some((Network::Testnet, AddressKind::P2shP2wpkh)),
        VPUB_TESTNET => Some((Network::Testnet, AddressKind::P2wpkh)),
        _ => None,
    }
}

/// Derive `discovery_limit` addresses on one chain, indexes `0..discovery_limit`.
///
/// `chain` is the raw selector: 0 = receive, 1 = change.
pub fn derive(
    key: &ExtendedPublicKey,
    chain: u32,
    discovery_limit: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    let chain = Chain::try_from(chain)?;
    let secp = Secp256k1::verification_only();
    let chain_key = key.chain_key(&secp, chain)?;

    (0..discovery_limit)
        .map(|index| key.address_at(&secp, &chain_key, chain, index))
        .collect()
}

/// Derive receive addresses followed by change addresses.
pub fn derive_wallet(
    key: &ExtendedPublicKey,
    discovery_limit: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    let mut addresses = Vec::with_capacity(2 * discovery_limit as usize);
    for chain in Chain::ALL {
        addresses.extend(derive(key, chain.selector(), discovery_limit)?);
    }
    Ok(addresses)
}
