// Copyright (c) 2024 The Botho Foundation

//! Tonic clients for the node daemon's two service surfaces.
//!
//! The channel is built lazily so engine construction never blocks on
//! the network; connectivity problems surface as statuses on the first
//! call, where the probes know how to read them.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};

use crate::error::EngineError;
use crate::rpc::proto::{
    AddressKind, GenSeedRequest, GenSeedResponse, GetInfoRequest, GetInfoResponse,
    NewAddressRequest, NewAddressResponse, SendPaymentRequest, SendPaymentResponse,
};
use crate::rpc::{LedgerRpc, WalletUnlockerRpc};

/// Per-request deadline enforced on the channel.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on establishing the underlying connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata key the daemon reads authentication material from.
const MACAROON_METADATA_KEY: &str = "macaroon";

const GEN_SEED_PATH: &str = "/ledgerrpc.WalletUnlocker/GenSeed";
const GET_INFO_PATH: &str = "/ledgerrpc.Ledger/GetInfo";
const NEW_ADDRESS_PATH: &str = "/ledgerrpc.Ledger/NewAddress";
const SEND_PAYMENT_PATH: &str = "/ledgerrpc.Ledger/SendPayment";

/// Build a lazily connecting channel to `host` (a `host:port` address).
///
/// When a CA certificate is supplied the channel speaks TLS; otherwise
/// it is plaintext, which matches daemons terminating TLS elsewhere.
pub fn build_channel(host: &str, tls_cert: Option<&[u8]>) -> Result<Channel, EngineError> {
    let scheme = if tls_cert.is_some() { "https" } else { "http" };
    let mut endpoint = Endpoint::from_shared(format!("{scheme}://{host}"))
        .map_err(|e| EngineError::Transport(format!("invalid host {host}: {e}")))?
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT);

    if let Some(pem) = tls_cert {
        let tls = ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem));
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| EngineError::Transport(format!("tls configuration failed: {e}")))?;
    }

    Ok(endpoint.connect_lazy())
}

/// Read a macaroon file and encode it the way the daemon expects it in
/// request metadata.
pub fn load_macaroon(path: &Path) -> Result<MetadataValue<Ascii>, EngineError> {
    let raw = std::fs::read(path).map_err(|e| {
        EngineError::Credentials(format!("failed to read macaroon {}: {e}", path.display()))
    })?;
    MetadataValue::try_from(hex::encode(raw).as_str())
        .map_err(|e| EngineError::Credentials(format!("macaroon is not valid metadata: {e}")))
}

async fn unary_call<Req, Resp>(
    grpc: &Grpc<Channel>,
    path: &'static str,
    macaroon: Option<&MetadataValue<Ascii>>,
    message: Req,
) -> Result<Resp, Status>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = grpc.clone();
    grpc.ready()
        .await
        .map_err(|e| Status::unknown(format!("service was not ready: {e}")))?;

    let mut request = Request::new(message);
    if let Some(macaroon) = macaroon {
        request.metadata_mut().insert(MACAROON_METADATA_KEY, macaroon.clone());
    }

    let codec: ProstCodec<Req, Resp> = ProstCodec::default();
    let response = grpc
        .unary(request, PathAndQuery::from_static(path), codec)
        .await?;
    Ok(response.into_inner())
}

/// Client for the unauthenticated wallet-unlocker surface.
#[derive(Clone)]
pub struct WalletUnlockerClient {
    grpc: Grpc<Channel>,
}

impl WalletUnlockerClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            grpc: Grpc::new(channel),
        }
    }
}

#[async_trait]
impl WalletUnlockerRpc for WalletUnlockerClient {
    async fn gen_seed(&self) -> Result<GenSeedResponse, Status> {
        unary_call(&self.grpc, GEN_SEED_PATH, None, GenSeedRequest::default()).await
    }
}

/// Client for the authenticated ledger surface. Attaches the macaroon
/// to every request when one is configured.
#[derive(Clone)]
pub struct LedgerClient {
    grpc: Grpc<Channel>,
    macaroon: Option<MetadataValue<Ascii>>,
}

impl LedgerClient {
    pub fn new(channel: Channel, macaroon: Option<MetadataValue<Ascii>>) -> Self {
        Self {
            grpc: Grpc::new(channel),
            macaroon,
        }
    }
}

#[async_trait]
impl LedgerRpc for LedgerClient {
    async fn get_info(&self) -> Result<GetInfoResponse, Status> {
        unary_call(
            &self.grpc,
            GET_INFO_PATH,
            self.macaroon.as_ref(),
            GetInfoRequest::default(),
        )
        .await
    }

    async fn new_address(&self, kind: AddressKind) -> Result<NewAddressResponse, Status> {
        unary_call(
            &self.grpc,
            NEW_ADDRESS_PATH,
            self.macaroon.as_ref(),
            NewAddressRequest { kind: kind as i32 },
        )
        .await
    }

    async fn send_payment(&self, payment_request: &str) -> Result<SendPaymentResponse, Status> {
        unary_call(
            &self.grpc,
            SEND_PAYMENT_PATH,
            self.macaroon.as_ref(),
            SendPaymentRequest {
                payment_request: payment_request.to_owned(),
            },
        )
        .await
    }
}
