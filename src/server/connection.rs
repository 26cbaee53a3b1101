use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, error, info};

use super::accounts::{handle_bind_request, Accounts};
use super::session::StubSession;
use crate::ldap::protocol::LdapProtocolOp;
use crate::ldap::{ResultCode, SimpleLdapCodec};

pub async fn handle_connection(socket: TcpStream, accounts: Arc<Accounts>) -> crate::Result<()> {
    let peer_addr = socket.peer_addr()?;
    debug!("Handling stub connection from {}", peer_addr);

    let mut framed = Framed::new(socket, SimpleLdapCodec);
    let mut session = StubSession::new();

    while let Some(result) = framed.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                // Unsupported operations end up here too; drop the client.
                error!("Error reading from {}: {}", peer_addr, e);
                break;
            }
        };
        debug!("Received LDAP message: {:?}", message);

        match message.protocol_op {
            LdapProtocolOp::BindRequest {
                ref dn,
                ref authentication,
                ..
            } => {
                let response =
                    handle_bind_request(message.message_id, dn, authentication, &accounts);
                if let LdapProtocolOp::BindResponse { ref result } = response.protocol_op {
                    let success = result.result_code == ResultCode::Success;
                    session.record_bind(dn, success);
                    if success {
                        info!("Successful bind for DN: {}", dn);
                    }
                }
                if let Err(e) = framed.send(response).await {
                    error!("Failed to send response: {}", e);
                    break;
                }
            }
            LdapProtocolOp::UnbindRequest => {
                if session.is_bound() {
                    debug!("Unbinding {:?}", session.bound_dn().unwrap_or_default());
                }
                session.unbind();
                debug!("Client unbind, closing connection");
                break;
            }
            LdapProtocolOp::BindResponse { .. } => {
                error!("Client sent a bind response, closing connection");
                break;
            }
        }
    }

    debug!(
        "Connection closed for {} after {} bind(s)",
        peer_addr,
        session.bind_count()
    );
    Ok(())
}
