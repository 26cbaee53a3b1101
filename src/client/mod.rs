//! Connection and bind wrapper over the `ldap3` client.
//!
//! `connect` only prepares a [`Resource`]; the network is first touched by
//! `bind`. A failed bind therefore reports transport problems such as
//! "Can't contact LDAP server" as well as credential problems, and always
//! leaves the wrapper disconnected.

pub mod account;
pub mod resource;

pub use resource::{NativeError, Resource, ResourceSettings};

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Options;
use crate::ldap::{describe, dn, ResultCode};
use crate::LdapError;

fn uri_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"ldap[is]?://").ok())
        .as_ref()
}

// Syntax check of a connect string the way the native client will parse it.
fn check_connect_string(connect_string: &str) -> Result<(), String> {
    let url = Url::parse(connect_string).map_err(|e| e.to_string())?;
    match url.scheme() {
        "ldap" | "ldaps" => Ok(()),
        "ldapi" if url.port().is_some() => Err("port in ldapi URI".to_string()),
        "ldapi" => Ok(()),
        other => Err(format!("unknown scheme {}", other)),
    }
}

/// Per-call overrides for [`Ldap::connect_with`]. `None` falls back to the
/// configured options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub use_ssl: Option<bool>,
    pub use_start_tls: Option<bool>,
    pub network_timeout: Option<u64>,
}

impl ConnectParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = Some(use_ssl);
        self
    }

    pub fn use_start_tls(mut self, use_start_tls: bool) -> Self {
        self.use_start_tls = Some(use_start_tls);
        self
    }

    pub fn network_timeout(mut self, seconds: u64) -> Self {
        self.network_timeout = Some(seconds);
        self
    }
}

/// The last error recorded on the native handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastError {
    pub code: u32,
    pub messages: Vec<String>,
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code > 0 {
            write!(f, "0x{:x} ", self.code)?;
        }
        if self.messages.is_empty() {
            write!(f, "(no error message from LDAP)")
        } else {
            write!(f, "({})", self.messages.join("; "))
        }
    }
}

#[derive(Debug, Default)]
pub struct Ldap {
    options: Options,
    resource: Option<Resource>,
    connect_string: Option<String>,
    bound_user: Option<String>,
}

impl Ldap {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replaces every option; the current connection is left alone.
    pub fn set_options(&mut self, options: Options) -> &mut Self {
        self.options = options;
        self
    }

    /// The native handle created by the last `connect`, if still connected.
    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn connect_string(&self) -> Option<&str> {
        self.connect_string.as_deref()
    }

    pub fn bound_user(&self) -> Option<&str> {
        self.bound_user.as_deref()
    }

    /// Code of the last error on the current handle; 0 without a handle.
    pub fn last_error_code(&self) -> u32 {
        self.resource.as_ref().map_or(0, Resource::last_error_code)
    }

    pub fn last_error(&self) -> LastError {
        let code = self.last_error_code();
        let Some(resource) = &self.resource else {
            return LastError {
                code,
                messages: Vec::new(),
            };
        };

        let mut messages = vec![describe(code).to_string()];
        if let Some(text) = resource.last_error().map(|e| e.text.as_str()) {
            if !text.is_empty() && !messages.iter().any(|m| m == text) {
                messages.push(text.to_string());
            }
        }
        LastError { code, messages }
    }

    // Message layout: "<last error>: <context>" when the handle carries an
    // error, else "0x<code>: <context>", else just the context.
    fn error(&self, context: &str, code: u32) -> LdapError {
        let last_code = self.last_error_code();
        if self.resource.is_some() && last_code != 0 {
            return LdapError::Ldap {
                code: last_code,
                message: format!("{}: {}", self.last_error(), context),
            };
        }
        let message = if code > 0 {
            format!("0x{:x}: {}", code, context)
        } else {
            context.to_string()
        };
        LdapError::Ldap { code, message }
    }

    pub async fn connect(&mut self) -> crate::Result<&mut Self> {
        self.connect_with(ConnectParams::default()).await
    }

    pub async fn connect_with(&mut self, params: ConnectParams) -> crate::Result<&mut Self> {
        let host = params
            .host
            .or_else(|| self.options.host.clone())
            .filter(|h| !h.is_empty());
        let port = params.port.unwrap_or(self.options.port);
        let mut use_ssl = params.use_ssl.unwrap_or(self.options.use_ssl);
        let use_start_tls = params.use_start_tls.unwrap_or(self.options.use_start_tls);
        let network_timeout = params
            .network_timeout
            .or(self.options.network_timeout)
            .filter(|t| *t > 0);

        let Some(host) = host else {
            return Err(LdapError::usage("A host parameter is required"));
        };

        // A URI in the host wins over the port and useSsl options.
        let is_uri = uri_pattern().is_some_and(|re| re.is_match(&host));
        let connect_string = if is_uri {
            use_ssl = false;
            host.clone()
        } else {
            let scheme = if use_ssl { "ldaps" } else { "ldap" };
            if port != 0 {
                format!("{}://{}:{}", scheme, host, port)
            } else {
                format!("{}://{}", scheme, host)
            }
        };

        self.disconnect().await;
        self.connect_string = None;

        if let Err(reason) = check_connect_string(&connect_string) {
            let native = NativeError::new(
                ResultCode::ParamError,
                format!("Invalid LDAP URI: {} ({})", connect_string, reason),
            );
            let context = if !is_uri && port != 0 {
                format!("{}:{}", host, port)
            } else {
                host
            };
            return Err(LdapError::Ldap {
                code: native.code,
                message: format!(
                    "0x{:x} ({}; {}): {}",
                    native.code,
                    describe(native.code),
                    native.text,
                    context
                ),
            });
        }
        self.connect_string = Some(connect_string.clone());

        let start_tls = use_start_tls && !use_ssl && !connect_string.starts_with("ldaps://");
        self.resource = Some(Resource::new(ResourceSettings {
            connect_string,
            referrals: self.options.opt_referrals,
            network_timeout: network_timeout.map(Duration::from_secs),
            start_tls,
        }));
        self.bound_user = None;

        Ok(self)
    }

    /// Binds with the configured `username` and `password`; anonymous when
    /// no username is configured.
    pub async fn bind(&mut self) -> crate::Result<&mut Self> {
        let username = self.options.username.clone();
        let password = self.options.password.clone();
        self.bind_with(username, password).await
    }

    /// Binds with explicit credentials. An empty username binds without a
    /// name; the password is still sent, so a non-empty one is refused by
    /// the server rather than silently dropped.
    pub async fn bind_as(&mut self, username: &str, password: &str) -> crate::Result<&mut Self> {
        let username = Some(username.to_string()).filter(|u| !u.is_empty());
        self.bind_with(username, Some(password.to_string())).await
    }

    // Any failure leaves the wrapper disconnected.
    async fn bind_with(
        &mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> crate::Result<&mut Self> {
        match self.try_bind(username, password).await {
            Ok(()) => Ok(self),
            Err(err) => {
                warn!(code = err.code(), error = %err, "Bind failed");
                self.disconnect().await;
                Err(err)
            }
        }
    }

    async fn try_bind(
        &mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> crate::Result<()> {
        let username = match username {
            Some(name) if !dn::is_dn(&name) => {
                if self.options.bind_requires_dn {
                    return Err(LdapError::usage("Binding requires username in DN form"));
                }
                Some(account::canonical_account_name(&self.options, &name)?)
            }
            other => other,
        };

        if self.resource.is_none() {
            self.connect().await?;
        }

        let password = password.unwrap_or_default().replace('\0', "");
        if username.is_some() && password.is_empty() && !self.options.allow_empty_password {
            return Err(LdapError::usage(
                "Empty password not allowed - see allowEmptyPassword option.",
            ));
        }

        let dn = username.as_deref().unwrap_or_default();

        let Some(resource) = self.resource.as_mut() else {
            return Err(LdapError::usage_with_code(
                ResultCode::ServerDown,
                "No LDAP resource to bind with",
            ));
        };

        match resource.simple_bind(dn, &password).await {
            Ok(()) => {
                let user = if dn.is_empty() { "<anonymous>" } else { dn };
                info!(user = %user, "Bind successful");
                self.bound_user = (!dn.is_empty()).then(|| dn.to_string());
                Ok(())
            }
            Err(native) => {
                let connect_string = self.connect_string.clone().unwrap_or_default();
                let context = if native.code == ResultCode::ServerDown as u32 || dn.is_empty() {
                    connect_string.as_str()
                } else {
                    dn
                };
                Err(self.error(context, native.code))
            }
        }
    }

    /// Unbinds and drops the native handle. Safe to call when not connected.
    pub async fn disconnect(&mut self) -> &mut Self {
        if let Some(mut resource) = self.resource.take() {
            debug!(connect_string = %resource.connect_string(), "Disconnecting");
            resource.unbind().await;
        }
        self.bound_user = None;
        self
    }
}
