use async_trait::async_trait;
use std::net::SocketAddr;

/// One datagram in, at most one datagram out
///
/// `None` means the request is silently discarded.
#[async_trait]
pub trait PacketHandler: Send + Sync {
    async fn handle(&self, data: Vec<u8>, remote: SocketAddr) -> Option<Vec<u8>>;

    /// Release resources held by the handler chain
    async fn dispose(&self) {}
}
