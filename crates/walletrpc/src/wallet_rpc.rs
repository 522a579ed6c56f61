//! Wallet RPC client.
//!
//! Typed async methods for the Monero wallet RPC interface: address,
//! balance, height, transfer history, sending, and account management.
//! Each method is a single JSON-RPC call; errors from the transport, the
//! envelope or the wallet itself are passed through unchanged.

use crate::client::{RpcClient, RpcConfig};
use crate::error::RpcError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

// =============================================================================
// Response Types
// =============================================================================

/// Balance info from `getbalance`.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub balance: u64,
    pub unlocked_balance: u64,
    #[serde(default)]
    pub multisig_import_needed: bool,
    #[serde(default)]
    pub per_subaddress: Vec<SubaddressBalance>,
}

/// Per-subaddress balance.
#[derive(Debug, Clone, Deserialize)]
pub struct SubaddressBalance {
    #[serde(default)]
    pub account_index: u32,
    #[serde(default)]
    pub address_index: u32,
    pub address: String,
    pub balance: u64,
    pub unlocked_balance: u64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub num_unspent_outputs: u64,
}

#[derive(Deserialize)]
struct AddressResponse {
    address: String,
}

#[derive(Deserialize)]
struct HeightResponse {
    height: u64,
}

/// Subaddress index pair.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
pub struct SubaddrIndex {
    pub major: u32,
    pub minor: u32,
}

/// Incoming transfer entry.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingTransfer {
    pub amount: u64,
    pub spent: bool,
    pub global_index: u64,
    pub tx_hash: String,
    #[serde(default)]
    pub subaddr_index: SubaddrIndex,
    #[serde(default)]
    pub key_image: String,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub unlocked: bool,
}

// The wallet leaves `transfers` out entirely when there is nothing to list.
#[derive(Deserialize)]
struct IncomingTransfersResponse {
    #[serde(default)]
    transfers: Vec<IncomingTransfer>,
}

/// Transfer entry from `get_transfers` / `get_transfer_by_txid`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferEntry {
    pub txid: String,
    #[serde(default)]
    pub payment_id: String,
    pub height: u64,
    pub timestamp: u64,
    pub amount: u64,
    #[serde(default)]
    pub fee: u64,
    #[serde(rename = "type")]
    #[serde(default)]
    pub transfer_type: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub unlock_time: u64,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub double_spend_seen: bool,
    #[serde(default)]
    pub subaddr_index: SubaddrIndex,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Transfer history grouped by direction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransfersResult {
    #[serde(rename = "in")]
    #[serde(default)]
    pub incoming: Vec<TransferEntry>,
    #[serde(default)]
    pub out: Vec<TransferEntry>,
    #[serde(default)]
    pub pending: Vec<TransferEntry>,
    #[serde(default)]
    pub failed: Vec<TransferEntry>,
    #[serde(default)]
    pub pool: Vec<TransferEntry>,
}

#[derive(Deserialize)]
struct TransferByTxidResponse {
    transfer: TransferEntry,
}

/// Transfer result from `transfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferResult {
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub tx_key: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub tx_blob: String,
    #[serde(default)]
    pub tx_metadata: String,
    #[serde(default)]
    pub unsigned_txset: String,
    #[serde(default)]
    pub multisig_txset: String,
}

impl TransferResult {
    /// Raw transaction bytes, present when the request set `get_tx_hex`.
    pub fn tx_blob_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.tx_blob)
    }
}

/// Result from `create_account`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountResult {
    pub account_index: u32,
    pub address: String,
}

/// Result from `create_address`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressResult {
    pub address: String,
    #[serde(default)]
    pub address_index: u32,
}

// =============================================================================
// Request Types
// =============================================================================

/// Destination for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub address: String,
    pub amount: u64,
}

/// Transfer priority levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum Priority {
    #[default]
    Default = 0,
    Unimportant = 1,
    Normal = 2,
    Elevated = 3,
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*self as u32)
    }
}

/// Which outputs `incoming_transfers` should list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    All,
    Available,
    Unavailable,
}

/// Parameters for `transfer`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferRequest {
    pub destinations: Vec<Destination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_index: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subaddr_indices: Vec<u32>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub get_tx_key: bool,
    pub get_tx_hex: bool,
    pub get_tx_metadata: bool,
    pub do_not_relay: bool,
}

impl TransferRequest {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self {
            destinations,
            ..Default::default()
        }
    }
}

/// Parameters for `get_transfers`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetTransfersRequest {
    #[serde(rename = "in")]
    pub incoming: bool,
    pub out: bool,
    pub pending: bool,
    pub failed: bool,
    pub pool: bool,
    pub filter_by_height: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_index: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subaddr_indices: Vec<u32>,
}

impl GetTransfersRequest {
    /// Request every category of transfer.
    pub fn all() -> Self {
        Self {
            incoming: true,
            out: true,
            pending: true,
            failed: true,
            pool: true,
            ..Default::default()
        }
    }

    /// Restrict results to blocks in `min..=max`.
    pub fn height_range(mut self, min: u64, max: u64) -> Self {
        self.filter_by_height = true;
        self.min_height = Some(min);
        self.max_height = Some(max);
        self
    }
}

#[derive(Serialize)]
struct TransferTypeParams {
    transfer_type: TransferType,
}

#[derive(Serialize)]
struct TxidParams<'a> {
    txid: &'a str,
}

#[derive(Serialize)]
struct CreateAccountParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateAddressParams<'a> {
    account_index: u32,
    label: &'a str,
}

// =============================================================================
// WalletRpc
// =============================================================================

/// Async RPC client for the wallet.
pub struct WalletRpc {
    client: RpcClient,
}

impl WalletRpc {
    /// Create a wallet RPC client connected to the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Ok(Self {
            client: RpcClient::new(url)?,
        })
    }

    /// Create with full configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self, RpcError> {
        Ok(Self {
            client: RpcClient::with_config(config)?,
        })
    }

    /// Wrap an already constructed RPC client.
    pub fn from_client(client: RpcClient) -> Self {
        Self { client }
    }

    /// Get the underlying RPC client.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    // =========================================================================
    // Balance & Address
    // =========================================================================

    /// Get the wallet's primary address.
    pub async fn get_address(&self) -> Result<String, RpcError> {
        let res: AddressResponse = self.client.call("getaddress", None::<()>).await?;
        Ok(res.address)
    }

    /// Get wallet balance.
    pub async fn get_balance(&self) -> Result<Balance, RpcError> {
        self.client.call("getbalance", None::<()>).await
    }

    /// Get the wallet's current block height.
    pub async fn get_height(&self) -> Result<u64, RpcError> {
        let res: HeightResponse = self.client.call("getheight", None::<()>).await?;
        Ok(res.height)
    }

    /// Create a new subaddress in `account_index`.
    pub async fn create_address(
        &self,
        account_index: u32,
        label: &str,
    ) -> Result<CreateAddressResult, RpcError> {
        self.client
            .call(
                "create_address",
                Some(CreateAddressParams {
                    account_index,
                    label,
                }),
            )
            .await
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Create a new account with an optional label.
    pub async fn create_account(
        &self,
        label: Option<&str>,
    ) -> Result<CreateAccountResult, RpcError> {
        self.client
            .call("create_account", Some(CreateAccountParams { label }))
            .await
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Send a transfer to one or more destinations.
    pub async fn transfer(&self, req: &TransferRequest) -> Result<TransferResult, RpcError> {
        self.client.call("transfer", Some(req)).await
    }

    /// Get transfer history.
    pub async fn get_transfers(
        &self,
        req: &GetTransfersRequest,
    ) -> Result<TransfersResult, RpcError> {
        self.client.call("get_transfers", Some(req)).await
    }

    /// Get a specific transfer by transaction ID.
    pub async fn get_transfer_by_txid(&self, txid: &str) -> Result<TransferEntry, RpcError> {
        let res: TransferByTxidResponse = self
            .client
            .call("get_transfer_by_txid", Some(TxidParams { txid }))
            .await?;
        Ok(res.transfer)
    }

    /// Get incoming transfers (outputs), grouped by the subaddress that
    /// received them.
    pub async fn incoming_transfers(
        &self,
        transfer_type: TransferType,
    ) -> Result<BTreeMap<SubaddrIndex, Vec<IncomingTransfer>>, RpcError> {
        let res: IncomingTransfersResponse = self
            .client
            .call("incoming_transfers", Some(TransferTypeParams { transfer_type }))
            .await?;

        let mut by_subaddr: BTreeMap<SubaddrIndex, Vec<IncomingTransfer>> = BTreeMap::new();
        for transfer in res.transfers {
            by_subaddr
                .entry(transfer.subaddr_index)
                .or_default()
                .push(transfer);
        }
        Ok(by_subaddr)
    }
}
