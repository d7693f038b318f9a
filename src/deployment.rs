//! Deployment Module
//!
//! Binds the abstract template parameters of a trade (addresses, asset id,
//! price, fee splits, deadline) to concrete values. Raw parameters are loaded
//! from TOML files and parsed using serde; binding turns the raw form into a
//! fully-typed, immutable `Deployment` that every slot predicate reads from.
//!
//! Binding checks presence of the parameters its trade kind requires and
//! that addresses parse as 32-byte hex, nothing else: checksum and network
//! format validation belong to the caller. A deployment that fails to bind
//! can never approve a trade.

use crate::types::{Address, AddressParseError};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Which marketplace contract a deployment instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeKind {
    /// Seller lists an asset into an escrow; buyers purchase out of it.
    EscrowListing,
    /// Buyer locks funds into an escrow as a standing offer for an asset.
    StandingOffer,
    /// Buyer purchases directly from a counterparty, no escrow, with a
    /// deadline.
    DirectSale,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeKind::EscrowListing => write!(f, "escrow-listing"),
            TradeKind::StandingOffer => write!(f, "standing-offer"),
            TradeKind::DirectSale => write!(f, "direct-sale"),
        }
    }
}

/// Raw deployment parameters as they appear on disk.
///
/// All trade-specific fields are optional here; `Deployment::bind` enforces
/// which ones the chosen trade kind actually requires.
///
/// # Example TOML
/// ```toml
/// trade = "escrow-listing"
/// asset_id = 42
/// price = 1000000
/// platform_fee = 10000
/// royalty_fee = 5000
/// init_fee = 201000
/// seller = "aa…(64 hex chars)"
/// platform = "bb…"
/// royalty = "cc…"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    pub trade: TradeKind,
    pub asset_id: u64,

    pub price: Option<u64>,
    pub platform_fee: Option<u64>,
    pub royalty_fee: Option<u64>,
    pub init_fee: Option<u64>,
    pub creator_cut: Option<u64>,
    pub seller_cut: Option<u64>,
    pub platform_cut: Option<u64>,
    pub deadline: Option<u64>,

    pub seller: Option<String>,
    pub buyer: Option<String>,
    pub platform: Option<String>,
    pub royalty: Option<String>,
    pub creator: Option<String>,
}

impl DeploymentConfig {
    /// Load raw deployment parameters from a TOML file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: DeploymentConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Errors raised while binding raw parameters into a deployment.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("missing parameter `{name}` for {trade} deployment")]
    MissingParameter {
        name: &'static str,
        trade: TradeKind,
    },

    #[error("invalid address for `{name}`: {source}")]
    InvalidAddress {
        name: &'static str,
        source: AddressParseError,
    },
}

/// Parameters of an escrow listing contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub asset_id: u64,
    pub price: u64,
    pub platform_fee: u64,
    pub royalty_fee: u64,
    /// Microalgos the seller seeds the escrow with at listing time.
    pub init_fee: u64,
    pub seller: Address,
    pub platform: Address,
    pub royalty: Address,
}

/// Parameters of a standing-offer contract.
///
/// Precondition: the offer escrow was funded with exactly
/// `price + royalty_fee + platform_fee` (plus minimum balance); the refund
/// leg of a withdrawal assumes this and the validator cannot detect an
/// under- or over-funded escrow on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferParams {
    pub asset_id: u64,
    pub price: u64,
    pub platform_fee: u64,
    pub royalty_fee: u64,
    pub buyer: Address,
    pub platform: Address,
    pub royalty: Address,
}

/// Parameters of a direct, escrow-less sale with a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectSaleParams {
    pub asset_id: u64,
    pub creator_cut: u64,
    pub seller_cut: u64,
    pub platform_cut: u64,
    /// Round before which the purchase group must become valid.
    pub deadline: u64,
    pub buyer: Address,
    pub creator: Address,
    pub seller: Address,
    pub platform: Address,
}

/// One concrete trade: a trade kind with every template parameter bound.
///
/// Immutable after construction and reusable across arbitrarily many
/// validation calls for the same trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    EscrowListing(ListingParams),
    StandingOffer(OfferParams),
    DirectSale(DirectSaleParams),
}

fn require<T>(value: Option<T>, name: &'static str, trade: TradeKind) -> Result<T, BindingError> {
    value.ok_or(BindingError::MissingParameter { name, trade })
}

fn require_addr(
    value: &Option<String>,
    name: &'static str,
    trade: TradeKind,
) -> Result<Address, BindingError> {
    let raw = value
        .as_deref()
        .ok_or(BindingError::MissingParameter { name, trade })?;
    raw.parse()
        .map_err(|source| BindingError::InvalidAddress { name, source })
}

impl Deployment {
    /// Bind raw parameters into a deployment, checking that every parameter
    /// the trade kind requires is present and that its addresses parse.
    pub fn bind(config: &DeploymentConfig) -> Result<Self, BindingError> {
        let trade = config.trade;
        match trade {
            TradeKind::EscrowListing => Ok(Deployment::EscrowListing(ListingParams {
                asset_id: config.asset_id,
                price: require(config.price, "price", trade)?,
                platform_fee: require(config.platform_fee, "platform_fee", trade)?,
                royalty_fee: require(config.royalty_fee, "royalty_fee", trade)?,
                init_fee: require(config.init_fee, "init_fee", trade)?,
                seller: require_addr(&config.seller, "seller", trade)?,
                platform: require_addr(&config.platform, "platform", trade)?,
                royalty: require_addr(&config.royalty, "royalty", trade)?,
            })),
            TradeKind::StandingOffer => Ok(Deployment::StandingOffer(OfferParams {
                asset_id: config.asset_id,
                price: require(config.price, "price", trade)?,
                platform_fee: require(config.platform_fee, "platform_fee", trade)?,
                royalty_fee: require(config.royalty_fee, "royalty_fee", trade)?,
                buyer: require_addr(&config.buyer, "buyer", trade)?,
                platform: require_addr(&config.platform, "platform", trade)?,
                royalty: require_addr(&config.royalty, "royalty", trade)?,
            })),
            TradeKind::DirectSale => Ok(Deployment::DirectSale(DirectSaleParams {
                asset_id: config.asset_id,
                creator_cut: require(config.creator_cut, "creator_cut", trade)?,
                seller_cut: require(config.seller_cut, "seller_cut", trade)?,
                platform_cut: require(config.platform_cut, "platform_cut", trade)?,
                deadline: require(config.deadline, "deadline", trade)?,
                buyer: require_addr(&config.buyer, "buyer", trade)?,
                creator: require_addr(&config.creator, "creator", trade)?,
                seller: require_addr(&config.seller, "seller", trade)?,
                platform: require_addr(&config.platform, "platform", trade)?,
            })),
        }
    }

    pub fn trade(&self) -> TradeKind {
        match self {
            Deployment::EscrowListing(_) => TradeKind::EscrowListing,
            Deployment::StandingOffer(_) => TradeKind::StandingOffer,
            Deployment::DirectSale(_) => TradeKind::DirectSale,
        }
    }

    /// The asset every variant of this deployment trades.
    pub fn asset_id(&self) -> u64 {
        match self {
            Deployment::EscrowListing(p) => p.asset_id,
            Deployment::StandingOffer(p) => p.asset_id,
            Deployment::DirectSale(p) => p.asset_id,
        }
    }
}
