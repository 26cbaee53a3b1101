#![allow(dead_code)]

use ldapconn::server::Accounts;
use ldapconn::{ConnectParams, Ldap, LdapError, OnlineSettings, Options, StubServer};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// Bind name that no directory knows about.
pub const IGNORED_DN: &str = "CN=ignored,DC=example,DC=com";
pub const IGNORED_PASSWORD: &str = "ignored";

pub const ADMIN_DN: &str = "cn=admin,dc=test,dc=com";
pub const ADMIN_PASSWORD: &str = "secret";

pub struct Stub {
    pub addr: SocketAddr,
    handle: JoinHandle<ldapconn::Result<()>>,
}

impl Stub {
    pub async fn start() -> Self {
        Self::start_with(
            Accounts::new(true)
                .with_account(ADMIN_DN, ADMIN_PASSWORD)
                .with_account("jdoe@example.com", "password"),
        )
        .await
    }

    pub async fn start_with(accounts: Accounts) -> Self {
        let server = StubServer::local(accounts).await.expect("stub server binds");
        let addr = server.local_addr().expect("stub server address");
        Stub {
            addr,
            handle: server.spawn(),
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn uri(&self) -> String {
        format!("ldap://{}", self.addr)
    }

    pub fn options(&self) -> Options {
        Options {
            host: Some(self.host()),
            port: self.port(),
            network_timeout: Some(2),
            ..Options::default()
        }
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Online settings, or `None` (with a note on stderr) when the online
/// suite is not enabled.
pub fn online() -> Option<OnlineSettings> {
    let settings = OnlineSettings::from_env().expect("readable TESTS_LDAPCONN_* variables");
    if !settings.enabled() {
        eprintln!("ldapconn online tests are not enabled");
        return None;
    }
    Some(settings)
}

#[track_caller]
pub fn assert_error_contains<T: std::fmt::Debug>(result: ldapconn::Result<T>, needle: &str) -> LdapError {
    match result {
        Ok(value) => panic!("expected an error containing {:?}, got Ok({:?})", needle, value),
        Err(err) => {
            assert!(
                err.message().contains(needle),
                "expected {:?} in {:?}",
                needle,
                err.message()
            );
            err
        }
    }
}

/// `connect` then bind with credentials the server will reject, the way the
/// connection tests prove the transport works.
pub async fn connect_and_bind_ignored(ldap: &mut Ldap, params: ConnectParams) -> ldapconn::Result<()> {
    ldap.connect_with(params)
        .await?
        .bind_as(IGNORED_DN, IGNORED_PASSWORD)
        .await?;
    Ok(())
}
