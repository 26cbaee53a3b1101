use ldap3::{LdapConnAsync, LdapConnSettings};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ldap::ResultCode;

/// An error reported by the native client, as the code and diagnostic text
/// recorded on the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    pub code: u32,
    pub text: String,
}

impl NativeError {
    pub fn new(code: ResultCode, text: impl Into<String>) -> Self {
        Self {
            code: code as u32,
            text: text.into(),
        }
    }

    // Failures while establishing the connection.
    fn from_open(err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::UrlParsing { .. }
            | ldap3::LdapError::UnknownScheme { .. }
            | ldap3::LdapError::EmptyUnixPath
            | ldap3::LdapError::PortInUnixPath => {
                Self::new(ResultCode::ParamError, err.to_string())
            }
            other => Self::new(ResultCode::ServerDown, other.to_string()),
        }
    }

    // Failures of an operation on an established connection.
    fn from_operation(err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::LdapResult { result } => Self {
                code: result.rc,
                text: result.text,
            },
            ldap3::LdapError::Timeout { .. } => Self::new(ResultCode::Timeout, err.to_string()),
            ldap3::LdapError::Io { .. }
            | ldap3::LdapError::EndOfStream { .. }
            | ldap3::LdapError::OpSend { .. }
            | ldap3::LdapError::ResultRecv { .. } => {
                Self::new(ResultCode::ServerDown, err.to_string())
            }
            other => Self::new(ResultCode::Other, other.to_string()),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}: {}", self.code, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSettings {
    pub connect_string: String,
    pub referrals: bool,
    pub network_timeout: Option<Duration>,
    pub start_tls: bool,
}

/// The native connection handle. Creating it does not touch the network:
/// the connection is opened by the first operation, the way native
/// `ldap_connect` defers to `ldap_bind`.
pub struct Resource {
    settings: ResourceSettings,
    protocol_version: u8,
    handle: Option<ldap3::Ldap>,
    last_error: Option<NativeError>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("settings", &self.settings)
            .field("protocol_version", &self.protocol_version)
            .field("open", &self.handle.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Resource {
    pub const PROTOCOL_VERSION: u8 = 3;

    pub fn new(settings: ResourceSettings) -> Self {
        debug!(
            connect_string = %settings.connect_string,
            referrals = settings.referrals,
            network_timeout = ?settings.network_timeout,
            start_tls = settings.start_tls,
            "Created LDAP resource"
        );
        Self {
            settings,
            protocol_version: Self::PROTOCOL_VERSION,
            handle: None,
            last_error: None,
        }
    }

    pub fn connect_string(&self) -> &str {
        &self.settings.connect_string
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn referrals(&self) -> bool {
        self.settings.referrals
    }

    pub fn network_timeout(&self) -> Option<Duration> {
        self.settings.network_timeout
    }

    pub fn start_tls(&self) -> bool {
        self.settings.start_tls
    }

    /// Whether the underlying connection has been established.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn last_error(&self) -> Option<&NativeError> {
        self.last_error.as_ref()
    }

    pub fn last_error_code(&self) -> u32 {
        self.last_error.as_ref().map_or(0, |e| e.code)
    }

    fn record<T>(&mut self, result: Result<T, NativeError>) -> Result<T, NativeError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.clone()),
        }
        result
    }

    async fn open(&self) -> Result<ldap3::Ldap, NativeError> {
        let mut conn_settings = LdapConnSettings::new().set_starttls(self.settings.start_tls);
        if let Some(timeout) = self.settings.network_timeout {
            conn_settings = conn_settings.set_conn_timeout(timeout);
        }

        debug!(connect_string = %self.settings.connect_string, "Opening LDAP connection");

        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &self.settings.connect_string)
            .await
            .map_err(NativeError::from_open)?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        Ok(ldap)
    }

    /// Simple bind; an empty DN and password make it anonymous.
    pub async fn simple_bind(&mut self, dn: &str, password: &str) -> Result<(), NativeError> {
        let result = self.try_simple_bind(dn, password).await;
        self.record(result)
    }

    async fn try_simple_bind(&mut self, dn: &str, password: &str) -> Result<(), NativeError> {
        let ldap = match self.handle.take() {
            Some(ldap) => ldap,
            None => self.open().await?,
        };
        let ldap = self.handle.insert(ldap);

        ldap.simple_bind(dn, password)
            .await
            .and_then(|result| result.success())
            .map(|_| ())
            .map_err(NativeError::from_operation)
    }

    /// Sends an unbind if the connection was opened, then drops the handle.
    pub async fn unbind(&mut self) {
        if let Some(mut ldap) = self.handle.take() {
            if let Err(e) = ldap.unbind().await {
                debug!(error = %e, "Unbind failed, dropping connection");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(connect_string: &str) -> ResourceSettings {
        ResourceSettings {
            connect_string: connect_string.to_string(),
            referrals: false,
            network_timeout: Some(Duration::from_secs(1)),
            start_tls: false,
        }
    }

    #[test]
    fn test_new_resource_is_not_open() {
        let resource = Resource::new(settings("ldap://localhost"));
        assert!(!resource.is_open());
        assert_eq!(resource.protocol_version(), 3);
        assert_eq!(resource.connect_string(), "ldap://localhost");
        assert_eq!(resource.network_timeout(), Some(Duration::from_secs(1)));
        assert_eq!(resource.last_error_code(), 0);
    }

    #[test]
    fn test_native_error_from_ldap_result() {
        let err = ldap3::LdapError::LdapResult {
            result: ldap3::LdapResult {
                rc: 49,
                matched: String::new(),
                text: "bad password".to_string(),
                refs: vec![],
                ctrls: vec![],
            },
        };
        let native = NativeError::from_operation(err);
        assert_eq!(native.code, 0x31);
        assert_eq!(native.text, "bad password");
    }

    #[test]
    fn test_native_error_from_io() {
        let err = ldap3::LdapError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(NativeError::from_open(err).code, ResultCode::ServerDown as u32);
    }

    #[tokio::test]
    async fn test_native_error_from_timeout() {
        let elapsed = tokio::time::timeout(Duration::ZERO, std::future::pending::<()>())
            .await
            .unwrap_err();
        let native = NativeError::from_operation(ldap3::LdapError::from(elapsed));
        assert_eq!(native.code, ResultCode::Timeout as u32);
        assert!(native.text.starts_with("timeout"));
    }

    #[test]
    fn test_native_error_fallback_is_other() {
        let native = NativeError::from_operation(ldap3::LdapError::DecodingUTF8);
        assert_eq!(native.code, ResultCode::Other as u32);
        assert_eq!(native.text, "utf8 decoding error");
    }

    #[test]
    fn test_native_error_from_closed_stream() {
        let native = NativeError::from_operation(ldap3::LdapError::EndOfStream);
        assert_eq!(native.code, ResultCode::ServerDown as u32);
    }

    #[test]
    fn test_native_error_from_unix_path() {
        let native = NativeError::from_open(ldap3::LdapError::PortInUnixPath);
        assert_eq!(native.code, ResultCode::ParamError as u32);
    }

    #[test]
    fn test_native_error_display() {
        let native = NativeError::new(ResultCode::ServerDown, "refused");
        assert_eq!(native.to_string(), "0x51: refused");
    }

    #[tokio::test]
    async fn test_bind_to_closed_port_records_server_down() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut resource = Resource::new(settings(&format!("ldap://127.0.0.1:{}", port)));
        let err = resource.simple_bind("cn=x", "y").await.unwrap_err();

        assert_eq!(err.code, ResultCode::ServerDown as u32);
        assert_eq!(resource.last_error_code(), 0x51);
        assert!(!resource.is_open());
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_param_error() {
        let mut resource = Resource::new(settings("http://127.0.0.1:1"));
        let err = resource.simple_bind("", "").await.unwrap_err();
        assert_eq!(err.code, ResultCode::ParamError as u32);
    }

    #[tokio::test]
    async fn test_unbind_without_connection_is_noop() {
        let mut resource = Resource::new(settings("ldap://localhost"));
        resource.unbind().await;
        assert!(!resource.is_open());
    }
}
