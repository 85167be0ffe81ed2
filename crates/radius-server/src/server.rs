use crate::auth_handler::SimpleAuthHandler;
use crate::config::Config;
use crate::dispatcher::ConcurrentPacketHandler;
use crate::error::ServerError;
use crate::handler::PacketHandler;
use crate::nas::DefaultNasProvider;
use crate::pipeline::RadiusPacketHandler;
use crate::transaction::MemoryRadiusTransaction;
use radius_proto::Packet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct Running {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    receiver: JoinHandle<()>,
}

/// RADIUS Server
///
/// Owns the UDP socket and feeds every datagram to a [`PacketHandler`]
/// chain, one task per datagram.
pub struct RadiusServer {
    bind_addr: SocketAddr,
    handler: Arc<dyn PacketHandler>,
    running: Mutex<Option<Running>>,
}

impl RadiusServer {
    pub fn new(bind_addr: SocketAddr, handler: Arc<dyn PacketHandler>) -> Self {
        RadiusServer {
            bind_addr,
            handler,
            running: Mutex::new(None),
        }
    }

    /// Assemble the standard handler chain from a configuration:
    /// dispatcher => pipeline (NAS list, transaction tracker, config users)
    ///
    /// Must be called within a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        let bind_addr = config.socket_addr()?;

        let mut auth_handler = SimpleAuthHandler::new();
        for user in &config.users {
            auth_handler.add_user(user.username.clone(), user.password.clone());
        }

        let pipeline = RadiusPacketHandler::new(
            Arc::new(DefaultNasProvider::new(config.nas.clone())),
            Arc::new(MemoryRadiusTransaction::new(config.transaction_config())),
            Arc::new(auth_handler),
        )
        .with_decode_options(config.decode_options()?);

        let dispatcher = ConcurrentPacketHandler::new(Arc::new(pipeline), config.concurrency)
            .with_dispose_timeout(config.dispose_timeout());

        Ok(Self::new(bind_addr, Arc::new(dispatcher)))
    }

    /// Address the socket is bound to, while running
    ///
    /// Useful when binding to port 0 (OS-assigned port).
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|running| running.local_addr)
    }

    /// Bind the socket and start receiving
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let socket = match UdpSocket::bind(self.bind_addr).await {
            Ok(socket) => Arc::new(socket),
            Err(e) => {
                error!(bind_addr = %self.bind_addr, error = %e, "Failed to start RADIUS server");
                return Err(e.into());
            }
        };
        let local_addr = socket.local_addr()?;
        info!("RADIUS server listening on {}", local_addr);

        let shutdown = Arc::new(Notify::new());
        let receiver = tokio::spawn(Self::receive_loop(
            socket,
            Arc::clone(&self.handler),
            Arc::clone(&shutdown),
        ));

        *running = Some(Running {
            local_addr,
            shutdown,
            receiver,
        });
        Ok(local_addr)
    }

    /// Stop receiving, drain and dispose the handler chain, close the socket
    pub async fn stop(&self) -> Result<(), ServerError> {
        let running = self.running.lock().await.take().ok_or(ServerError::NotRunning)?;

        running.shutdown.notify_one();
        if let Err(e) = running.receiver.await {
            warn!(error = %e, "Receive loop ended abnormally");
        }

        self.handler.dispose().await;
        info!(addr = %running.local_addr, "RADIUS server stopped");
        Ok(())
    }

    /// Serve until `signal` completes, then stop gracefully
    pub async fn run_until<F>(&self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        signal.await;
        self.stop().await
    }

    async fn receive_loop(socket: Arc<UdpSocket>, handler: Arc<dyn PacketHandler>, shutdown: Arc<Notify>) {
        // One extra byte so oversized datagrams are seen as such by the decoder
        let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE + 1];

        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                received = socket.recv_from(&mut buf) => {
                    let (len, addr) = match received {
                        Ok(received) => received,
                        Err(e) => {
                            warn!(error = %e, "Failed to receive datagram");
                            continue;
                        }
                    };

                    let data = buf[..len].to_vec();
                    let handler = Arc::clone(&handler);
                    let socket = Arc::clone(&socket);

                    tokio::spawn(async move {
                        let Some(response) = handler.handle(data, addr).await else {
                            return;
                        };
                        if let Err(e) = socket.send_to(&response, addr).await {
                            warn!(client_addr = %addr, error = %e, "Failed to send response");
                        }
                    });
                }
            }
        }

        debug!("Receive loop stopped");
    }
}
