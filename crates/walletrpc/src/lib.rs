//! Wallet RPC client library.
//!
//! Provides a typed async client for the Monero wallet JSON-RPC interface,
//! built on a small JSON-RPC 2.0 envelope codec and a one-request-per-call
//! HTTP transport.
//!
//! # Example
//!
//! ```ignore
//! use walletrpc::WalletRpc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), walletrpc::RpcError> {
//!     let wallet = WalletRpc::new("http://localhost:18083")?;
//!     let balance = wallet.get_balance().await?;
//!     println!("Unlocked: {}", balance.unlocked_balance);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod envelope;
pub mod client;
pub mod wallet_rpc;

pub use client::{RpcClient, RpcConfig};
pub use error::{ErrorCode, ErrorKind, RpcError};
pub use wallet_rpc::WalletRpc;
