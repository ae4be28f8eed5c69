// Copyright (c) 2024 The Botho Foundation

//! Hand-maintained prost mirror of `proto/ledger.proto`.
//!
//! The daemon's RPC surface used here is four unary methods, which does
//! not justify a build-time codegen dependency on protoc. Keep these
//! definitions in sync with the proto file when the surface changes.

/// Request for the wallet-independent seed call on the unlocker surface.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenSeedRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GenSeedResponse {
    /// Mnemonic encoding of a freshly generated cipher seed.
    #[prost(string, repeated, tag = "1")]
    pub cipher_seed_mnemonic: Vec<String>,
}

/// Request for the authenticated node status call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInfoRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInfoResponse {
    #[prost(string, tag = "1")]
    pub version: String,
    /// Hex-encoded public key identifying the node.
    #[prost(string, tag = "2")]
    pub identity_pubkey: String,
    #[prost(uint32, tag = "3")]
    pub block_height: u32,
    #[prost(bool, tag = "4")]
    pub synced_to_chain: bool,
    /// Chains the node is actively tracking.
    #[prost(message, repeated, tag = "5")]
    pub chains: Vec<ChainInfo>,
}

/// One chain/network pair the node reports in its status.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChainInfo {
    #[prost(string, tag = "1")]
    pub chain: String,
    #[prost(string, tag = "2")]
    pub network: String,
}

/// Address formats the daemon can derive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AddressKind {
    WitnessPubkeyHash = 0,
    /// Pay-to-witness-key-hash nested in pay-to-script-hash.
    NestedPubkeyHash = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NewAddressRequest {
    #[prost(enumeration = "AddressKind", tag = "1")]
    pub kind: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NewAddressResponse {
    #[prost(string, tag = "1")]
    pub address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendPaymentRequest {
    /// Encoded invoice naming the destination and amount.
    #[prost(string, tag = "1")]
    pub payment_request: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendPaymentResponse {
    /// Empty when the payment settled; a reason string otherwise.
    #[prost(string, tag = "1")]
    pub payment_error: String,
    #[prost(bytes = "vec", tag = "2")]
    pub payment_preimage: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub payment_hash: Vec<u8>,
}
