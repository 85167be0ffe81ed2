//! Request processing: NAS lookup, decode, duplicate check, response
//!
//! Protocol failures (unknown client, malformed packet, retransmission)
//! are logged and answered with silence. So are unexpected errors, which
//! never escape the handler.

use crate::auth_handler::AuthHandler;
use crate::error::ServerError;
use crate::handler::PacketHandler;
use crate::nas::{Nas, NasProvider};
use crate::transaction::{RadiusTransaction, TransactionKey};
use async_trait::async_trait;
use radius_proto::{
    verify_accounting_request_authenticator, AttributeType, AttributeValue, Code, DecodeOptions, Packet,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct RadiusPacketHandler {
    nas_provider: Arc<dyn NasProvider>,
    transactions: Arc<dyn RadiusTransaction>,
    auth_handler: Arc<dyn AuthHandler>,
    decode_options: DecodeOptions,
}

impl RadiusPacketHandler {
    pub fn new(
        nas_provider: Arc<dyn NasProvider>,
        transactions: Arc<dyn RadiusTransaction>,
        auth_handler: Arc<dyn AuthHandler>,
    ) -> Self {
        RadiusPacketHandler {
            nas_provider,
            transactions,
            auth_handler,
            decode_options: DecodeOptions::default(),
        }
    }

    pub fn with_decode_options(mut self, decode_options: DecodeOptions) -> Self {
        self.decode_options = decode_options;
        self
    }

    async fn process(&self, data: &[u8], remote: SocketAddr) -> Result<Option<Vec<u8>>, ServerError> {
        let source_ip = remote.ip().to_canonical();

        let Some(nas) = self.nas_provider.get_nas(source_ip).await else {
            warn!(
                client_ip = %source_ip,
                client_port = remote.port(),
                "Request from unknown NAS, discarding"
            );
            return Ok(None);
        };

        let request = match Packet::decode(data, &nas.secret, &self.decode_options) {
            Ok(request) => request,
            Err(e) => {
                warn!(
                    client_ip = %source_ip,
                    client_port = remote.port(),
                    nas = %nas.short_name,
                    kind = %e.kind(),
                    error = %e,
                    "Failed to decode packet, discarding"
                );
                return Ok(None);
            }
        };

        let key = TransactionKey::new(SocketAddr::new(source_ip, remote.port()), request.identifier());
        if !self.transactions.acquire(key).await {
            warn!(
                client_ip = %source_ip,
                client_port = remote.port(),
                request_id = request.identifier(),
                "Duplicate request, discarding"
            );
            return Ok(None);
        }

        let result = self.respond(data, &request, &nas, remote);
        self.transactions.release(key).await;
        result
    }

    fn respond(
        &self,
        data: &[u8],
        request: &Packet,
        nas: &Nas,
        remote: SocketAddr,
    ) -> Result<Option<Vec<u8>>, ServerError> {
        debug!(
            packet_type = %request.code(),
            client_addr = %remote,
            request_id = request.identifier(),
            nas = %nas.short_name,
            "Received RADIUS packet"
        );

        let response = match request.code() {
            Code::AccessRequest => self.handle_access_request(request, remote),
            Code::StatusServer => Packet::reply(request, Code::AccessAccept),
            Code::AccountingRequest => {
                if !verify_accounting_request_authenticator(data, &nas.secret) {
                    warn!(
                        client_ip = %remote.ip(),
                        client_port = remote.port(),
                        request_id = request.identifier(),
                        nas = %nas.short_name,
                        "Invalid Accounting-Request authenticator, discarding"
                    );
                    return Ok(None);
                }
                Packet::reply(request, Code::AccountingResponse)
            }
            code => {
                debug!(packet_type = %code, client_addr = %remote, "Not a request, discarding");
                return Ok(None);
            }
        };

        let encoded = response.encode_response(&nas.secret)?;
        debug!(
            response_type = %response.code(),
            client_addr = %remote,
            request_id = response.identifier(),
            "Sending RADIUS response"
        );
        Ok(Some(encoded))
    }

    /// Handle Access-Request packet (PAP or CHAP)
    fn handle_access_request(&self, request: &Packet, remote: SocketAddr) -> Packet {
        let username = request
            .find_attribute(AttributeType::UserName)
            .and_then(|attr| attr.as_str())
            .unwrap_or_default();

        let authenticated = if username.is_empty() {
            false
        } else if let Some(AttributeValue::ChapPassword(chap)) = request
            .find_attribute(AttributeType::ChapPassword)
            .map(|attr| attr.value())
        {
            debug!(username = %username, "Using CHAP authentication");
            // Without CHAP-Challenge the Request Authenticator is the challenge
            self.auth_handler
                .authenticate_chap(username, chap, request.authenticator())
        } else if let Some(password) = request
            .find_attribute(AttributeType::UserPassword)
            .and_then(|attr| attr.as_str())
        {
            debug!(username = %username, "Using PAP authentication");
            self.auth_handler.authenticate(username, password)
        } else {
            false
        };

        if authenticated {
            info!(
                username = %username,
                client_ip = %remote.ip(),
                request_id = request.identifier(),
                "Authentication successful"
            );
            let mut response = Packet::reply(request, Code::AccessAccept);
            for attr in self.auth_handler.get_accept_attributes(username) {
                response.add_attribute(attr);
            }
            response
        } else {
            warn!(
                username = %username,
                client_ip = %remote.ip(),
                request_id = request.identifier(),
                "Authentication failed"
            );
            let mut response = Packet::reply(request, Code::AccessReject);
            for attr in self.auth_handler.get_reject_attributes(username) {
                response.add_attribute(attr);
            }
            response
        }
    }
}

#[async_trait]
impl PacketHandler for RadiusPacketHandler {
    async fn handle(&self, data: Vec<u8>, remote: SocketAddr) -> Option<Vec<u8>> {
        match self.process(&data, remote).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    client_ip = %remote.ip(),
                    client_port = remote.port(),
                    error = %e,
                    "Unexpected error while handling packet"
                );
                None
            }
        }
    }

    async fn dispose(&self) {
        self.transactions.dispose().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::StaticResolver;
    use crate::auth_handler::SimpleAuthHandler;
    use crate::nas::{DefaultNasProvider, NasAddress, NasAddressKind};
    use crate::transaction::{MemoryRadiusTransaction, TransactionConfig};
    use radius_proto::{
        calculate_accounting_request_authenticator, compute_chap_response, verify_response_authenticator,
        Attribute, ChapResponse, SharedSecret,
    };
    use std::time::Duration;

    const SECRET: &str = "lab-secret";

    fn handler() -> (RadiusPacketHandler, Arc<MemoryRadiusTransaction>) {
        let nas = DefaultNasProvider::with_resolver(
            vec![Nas::new(
                "lab",
                NasAddress::new("192.168.1.0/24", NasAddressKind::IpAddr),
                SECRET,
            )],
            Arc::new(StaticResolver::new()),
        );
        let transactions = Arc::new(MemoryRadiusTransaction::new(TransactionConfig {
            duplicate_timeout: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(300),
        }));
        let mut users = SimpleAuthHandler::new();
        users.add_user("alice", "wonderland");

        let handler = RadiusPacketHandler::new(Arc::new(nas), transactions.clone(), Arc::new(users));
        (handler, transactions)
    }

    fn remote() -> SocketAddr {
        "192.168.1.20:50000".parse().unwrap()
    }

    fn pap_request(identifier: u8, username: &str, password: &str) -> (Vec<u8>, [u8; 16]) {
        let authenticator = [identifier; 16];
        let secret = SharedSecret::from(SECRET);
        let mut packet = Packet::new(Code::AccessRequest, identifier, authenticator);
        packet.add_attribute(Attribute::user_name(username).unwrap());
        packet.add_attribute(Attribute::user_password(password, &secret, authenticator).unwrap());
        (packet.encode().unwrap(), authenticator)
    }

    #[tokio::test]
    async fn test_pap_accept() {
        let (handler, _) = handler();
        let (request, authenticator) = pap_request(1, "alice", "wonderland");

        let response = handler.handle(request, remote()).await.unwrap();
        assert_eq!(response[0], Code::AccessAccept.as_u8());
        assert_eq!(response[1], 1);
        assert!(verify_response_authenticator(&response, &authenticator, &SharedSecret::from(SECRET)));
    }

    #[tokio::test]
    async fn test_pap_reject_carries_reply_message() {
        let (handler, _) = handler();
        let (request, _) = pap_request(2, "alice", "wrong");

        let response = handler.handle(request, remote()).await.unwrap();
        let packet = Packet::decode(&response, &SharedSecret::from(SECRET), &DecodeOptions::default()).unwrap();
        assert_eq!(packet.code(), Code::AccessReject);
        assert_eq!(
            packet.find_attribute(AttributeType::ReplyMessage).and_then(|a| a.as_str()),
            Some("Authentication failed")
        );
    }

    #[tokio::test]
    async fn test_chap_accept() {
        let (handler, _) = handler();
        let authenticator = [0x42u8; 16];
        let mut packet = Packet::new(Code::AccessRequest, 3, authenticator);
        packet.add_attribute(Attribute::user_name("alice").unwrap());
        packet.add_attribute(
            Attribute::chap_password(ChapResponse {
                ident: 5,
                response: compute_chap_response(5, "wonderland", &authenticator),
            })
            .unwrap(),
        );

        let response = handler.handle(packet.encode().unwrap(), remote()).await.unwrap();
        assert_eq!(response[0], Code::AccessAccept.as_u8());
    }

    #[tokio::test]
    async fn test_unknown_nas_is_discarded() {
        let (handler, transactions) = handler();
        let (request, _) = pap_request(4, "alice", "wonderland");

        assert!(handler.handle(request, "10.9.9.9:1812".parse().unwrap()).await.is_none());
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_packet_is_discarded() {
        let (handler, transactions) = handler();
        let (mut request, _) = pap_request(5, "alice", "wonderland");
        request.push(0);

        assert!(handler.handle(request, remote()).await.is_none());
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_is_discarded() {
        let (handler, transactions) = handler();
        let (request, _) = pap_request(6, "alice", "wonderland");

        assert!(handler.handle(request.clone(), remote()).await.is_some());
        // Retransmission after the first was answered
        assert!(handler.handle(request.clone(), remote()).await.is_none());
        assert_eq!(transactions.len(), 1);

        // Same identifier from another source port is a different transaction
        assert!(handler.handle(request, "192.168.1.20:50001".parse().unwrap()).await.is_some());
    }

    #[tokio::test]
    async fn test_status_server_and_accounting() {
        let (handler, _) = handler();

        let status = Packet::new(Code::StatusServer, 7, [7u8; 16]).encode().unwrap();
        let response = handler.handle(status, remote()).await.unwrap();
        assert_eq!(response[0], Code::AccessAccept.as_u8());

        let response = handler.handle(accounting_request(8, None), remote()).await.unwrap();
        assert_eq!(response[0], Code::AccountingResponse.as_u8());
        assert_eq!(response.len(), 20);
    }

    /// Accounting-Request signed with the NAS secret unless `authenticator` is given
    fn accounting_request(identifier: u8, authenticator: Option<[u8; 16]>) -> Vec<u8> {
        let mut packet = Packet::new(Code::AccountingRequest, identifier, [0u8; 16]);
        packet.add_attribute(Attribute::user_name("alice").unwrap());
        let mut data = packet.encode().unwrap();
        let authenticator = authenticator.unwrap_or_else(|| {
            calculate_accounting_request_authenticator(&data, &SharedSecret::from(SECRET))
        });
        data[4..20].copy_from_slice(&authenticator);
        data
    }

    #[tokio::test]
    async fn test_forged_accounting_request_is_discarded() {
        let (handler, transactions) = handler();

        assert!(handler.handle(accounting_request(12, Some([0xEE; 16])), remote()).await.is_none());

        // Signed with some other secret
        let mut data = accounting_request(13, None);
        let wrong = calculate_accounting_request_authenticator(&data, &SharedSecret::from("other-secret"));
        data[4..20].copy_from_slice(&wrong);
        assert!(handler.handle(data, remote()).await.is_none());

        // Still tracked: a retransmission within the window is a duplicate either way
        assert_eq!(transactions.len(), 2);
    }

    #[tokio::test]
    async fn test_response_codes_are_discarded() {
        let (handler, _) = handler();
        let accept = Packet::new(Code::AccessAccept, 9, [0u8; 16]).encode().unwrap();
        assert!(handler.handle(accept, remote()).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected() {
        let (handler, _) = handler();
        let mut packet = Packet::new(Code::AccessRequest, 10, [1u8; 16]);
        packet.add_attribute(Attribute::user_name("alice").unwrap());

        let response = handler.handle(packet.encode().unwrap(), remote()).await.unwrap();
        assert_eq!(response[0], Code::AccessReject.as_u8());
    }

    #[tokio::test]
    async fn test_dispose_clears_transactions() {
        let (handler, transactions) = handler();
        let (request, _) = pap_request(11, "alice", "wonderland");
        handler.handle(request, remote()).await;
        assert_eq!(transactions.len(), 1);

        handler.dispose().await;
        assert!(transactions.is_empty());
    }
}
