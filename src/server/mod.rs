//! In-process LDAP bind responder, for exercising the client without an
//! external directory server.

pub mod accounts;
pub mod connection;
pub mod session;

pub use accounts::Accounts;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub struct StubServer {
    listener: TcpListener,
    accounts: Arc<Accounts>,
}

impl StubServer {
    pub async fn bind(addr: impl ToSocketAddrs, accounts: Accounts) -> crate::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(
            anonymous = accounts.is_anonymous_allowed(),
            "Stub LDAP server listening on {}",
            listener.local_addr()?
        );

        Ok(Self {
            listener,
            accounts: Arc::new(accounts),
        })
    }

    /// Binds to an ephemeral port on the loopback interface.
    pub async fn local(accounts: Accounts) -> crate::Result<Self> {
        Self::bind("127.0.0.1:0", accounts).await
    }

    pub fn local_addr(&self) -> crate::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> crate::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    debug!("New connection from {}", addr);

                    let accounts = Arc::clone(&self.accounts);
                    tokio::spawn(async move {
                        if let Err(e) = connection::handle_connection(socket, accounts).await {
                            error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Runs the server on the current runtime until the handle is aborted.
    pub fn spawn(self) -> JoinHandle<crate::Result<()>> {
        tokio::spawn(self.run())
    }
}
