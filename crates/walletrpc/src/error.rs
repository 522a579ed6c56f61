//! RPC error types.
//!
//! Every failure of a wallet call is returned as a single [`RpcError`]. The
//! variants fall into four groups, reported by [`RpcError::kind`]:
//!
//! - transport: the server could not be reached or answered with a
//!   non-success HTTP status
//! - envelope: the JSON-RPC envelope could not be built or parsed
//! - rpc: the wallet answered with a well-formed error object
//! - result shape: the wallet reported success but the result did not have
//!   the expected shape
//!
//! Server error codes are classified by [`ErrorCode::from_code`].

use serde_json::Value;
use thiserror::Error;

/// JSON-RPC 2.0 standard error codes.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Code reported by [`RpcError::code`] for errors synthesized on the client
/// side. Matches the wallet's own "unknown error" code.
pub const LOCAL_ERROR_CODE: i64 = -1;

/// Symbolic kind of a wallet RPC error code.
///
/// Codes -1 through -45 are the wallet RPC server's own table; the
/// remaining named variants are the JSON-RPC 2.0 reserved codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unknown,
    WrongAddress,
    DaemonIsBusy,
    GenericTransferError,
    WrongPaymentId,
    TransferType,
    Denied,
    WrongTxId,
    WrongSignature,
    WrongKeyImage,
    WrongUri,
    WrongIndex,
    NotOpen,
    AccountIndexOutOfBounds,
    AddressIndexOutOfBounds,
    TxNotPossible,
    NotEnoughMoney,
    TxTooLarge,
    NotEnoughOutsToMix,
    ZeroDestination,
    WalletAlreadyExists,
    InvalidPassword,
    NoWalletDir,
    NoTxKey,
    WrongKey,
    BadHex,
    BadTxMetadata,
    AlreadyMultisig,
    WatchOnly,
    BadMultisigInfo,
    NotMultisig,
    WrongLr,
    ThresholdNotReached,
    BadMultisigTxData,
    MultisigSignature,
    MultisigSubmission,
    NotEnoughUnlockedMoney,
    NoDaemonConnection,
    BadUnsignedTxData,
    BadSignedTxData,
    SignedSubmission,
    SignUnsigned,
    NonDeterministic,
    InvalidLogLevel,
    AttributeNotFound,
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

/// Code table, kept in one place so both directions agree.
const CODE_TABLE: &[(i64, ErrorCode)] = &[
    (-1, ErrorCode::Unknown),
    (-2, ErrorCode::WrongAddress),
    (-3, ErrorCode::DaemonIsBusy),
    (-4, ErrorCode::GenericTransferError),
    (-5, ErrorCode::WrongPaymentId),
    (-6, ErrorCode::TransferType),
    (-7, ErrorCode::Denied),
    (-8, ErrorCode::WrongTxId),
    (-9, ErrorCode::WrongSignature),
    (-10, ErrorCode::WrongKeyImage),
    (-11, ErrorCode::WrongUri),
    (-12, ErrorCode::WrongIndex),
    (-13, ErrorCode::NotOpen),
    (-14, ErrorCode::AccountIndexOutOfBounds),
    (-15, ErrorCode::AddressIndexOutOfBounds),
    (-16, ErrorCode::TxNotPossible),
    (-17, ErrorCode::NotEnoughMoney),
    (-18, ErrorCode::TxTooLarge),
    (-19, ErrorCode::NotEnoughOutsToMix),
    (-20, ErrorCode::ZeroDestination),
    (-21, ErrorCode::WalletAlreadyExists),
    (-22, ErrorCode::InvalidPassword),
    (-23, ErrorCode::NoWalletDir),
    (-24, ErrorCode::NoTxKey),
    (-25, ErrorCode::WrongKey),
    (-26, ErrorCode::BadHex),
    (-27, ErrorCode::BadTxMetadata),
    (-28, ErrorCode::AlreadyMultisig),
    (-29, ErrorCode::WatchOnly),
    (-30, ErrorCode::BadMultisigInfo),
    (-31, ErrorCode::NotMultisig),
    (-32, ErrorCode::WrongLr),
    (-33, ErrorCode::ThresholdNotReached),
    (-34, ErrorCode::BadMultisigTxData),
    (-35, ErrorCode::MultisigSignature),
    (-36, ErrorCode::MultisigSubmission),
    (-37, ErrorCode::NotEnoughUnlockedMoney),
    (-38, ErrorCode::NoDaemonConnection),
    (-39, ErrorCode::BadUnsignedTxData),
    (-40, ErrorCode::BadSignedTxData),
    (-41, ErrorCode::SignedSubmission),
    (-42, ErrorCode::SignUnsigned),
    (-43, ErrorCode::NonDeterministic),
    (-44, ErrorCode::InvalidLogLevel),
    (-45, ErrorCode::AttributeNotFound),
    (codes::PARSE_ERROR, ErrorCode::ParseError),
    (codes::INVALID_REQUEST, ErrorCode::InvalidRequest),
    (codes::METHOD_NOT_FOUND, ErrorCode::MethodNotFound),
    (codes::INVALID_PARAMS, ErrorCode::InvalidParams),
    (codes::INTERNAL_ERROR, ErrorCode::InternalError),
];

impl ErrorCode {
    /// Classify a numeric error code. Unmapped codes become `Unknown`.
    pub fn from_code(code: i64) -> Self {
        CODE_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorCode::Unknown)
    }

    /// Canonical numeric value for this kind.
    pub fn code(self) -> i64 {
        CODE_TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(c, _)| *c)
            .unwrap_or(LOCAL_ERROR_CODE)
    }
}

/// Coarse category of an [`RpcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Envelope,
    Rpc,
    ResultShape,
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request {method} to {url} failed: {source}")]
    Http {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url} for {method}: {body}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("cannot encode request for {method}: {reason}")]
    Encode { method: String, reason: String },

    #[error("malformed response envelope for {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response for {method} has neither result nor error")]
    MissingResult { method: String },

    #[error("response id {got} for {method} does not match request id {expected}")]
    IdMismatch {
        method: String,
        expected: u64,
        got: Value,
    },

    #[error("RPC error {code} ({kind:?}) from {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        kind: ErrorCode,
        message: String,
        /// Optional `data` member of the server's error object.
        data: Option<Value>,
    },

    #[error("unexpected result shape for {method}: {source}")]
    UnexpectedResult {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Build an RPC error from a server error object, classifying its code.
    pub fn rpc(method: &str, code: i64, message: String) -> Self {
        RpcError::Rpc {
            method: method.to_string(),
            code,
            kind: ErrorCode::from_code(code),
            message,
            data: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Client(_) | RpcError::Http { .. } | RpcError::HttpStatus { .. } => {
                ErrorKind::Transport
            }
            RpcError::Encode { .. }
            | RpcError::Decode { .. }
            | RpcError::MissingResult { .. }
            | RpcError::IdMismatch { .. } => ErrorKind::Envelope,
            RpcError::Rpc { .. } => ErrorKind::Rpc,
            RpcError::UnexpectedResult { .. } => ErrorKind::ResultShape,
        }
    }

    /// True when the error was produced on the client side rather than
    /// reported by the wallet.
    pub fn is_local(&self) -> bool {
        self.kind() != ErrorKind::Rpc
    }

    /// Server error code, or [`LOCAL_ERROR_CODE`] for local errors.
    pub fn code(&self) -> i64 {
        match self {
            RpcError::Rpc { code, .. } => *code,
            _ => LOCAL_ERROR_CODE,
        }
    }

    /// Classified kind of the server error code. Local errors report
    /// `ErrorCode::Unknown`; use [`RpcError::is_local`] to tell them apart.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RpcError::Rpc { kind, .. } => *kind,
            _ => ErrorCode::Unknown,
        }
    }

    /// Server-supplied message, verbatim.
    pub fn rpc_message(&self) -> Option<&str> {
        match self {
            RpcError::Rpc { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Extra diagnostic data the server attached to its error, if any.
    pub fn rpc_data(&self) -> Option<&Value> {
        match self {
            RpcError::Rpc { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}
