use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::LdapError;

/// Prefix of the environment variables driving the online test suite.
pub const ONLINE_ENV_PREFIX: &str = "TESTS_LDAPCONN";

pub const DEFAULT_PORT: u16 = 389;
pub const DEFAULT_SSL_PORT: u16 = 636;

#[derive(Parser, Debug)]
#[command(name = "ldapconn")]
#[command(about = "Connect to an LDAP server and try a simple bind")]
#[command(version)]
pub struct CliArgs {
    /// Host name or ldap:// / ldaps:// / ldapi:// URI
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to connect to (0 picks the library default)
    #[arg(short, long, default_value = "0")]
    pub port: u16,

    /// Connect with ldaps
    #[arg(long)]
    pub use_ssl: bool,

    /// Upgrade a plain connection with StartTLS
    #[arg(long)]
    pub use_start_tls: bool,

    /// Network timeout in seconds
    #[arg(long)]
    pub network_timeout: Option<u64>,

    /// DN (or account name) to bind as; anonymous bind when omitted
    #[arg(short = 'D', long)]
    pub bind_dn: Option<String>,

    /// Bind password
    #[arg(short = 'w', long)]
    pub password: Option<String>,

    /// Options file (yaml, toml or json) applied before the flags above
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level: debug, info, warn, error
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            return tracing::Level::DEBUG;
        }
        parse_log_level(&self.log_level)
    }
}

pub fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

/// How non-DN account names are rewritten before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountCanonicalForm {
    #[default]
    Auto = 0,
    Dn = 1,
    Username = 2,
    Backslash = 3,
    Principal = 4,
}

impl AccountCanonicalForm {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "0" | "auto" => Some(Self::Auto),
            "1" | "dn" => Some(Self::Dn),
            "2" | "username" => Some(Self::Username),
            "3" | "backslash" => Some(Self::Backslash),
            "4" | "principal" => Some(Self::Principal),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Options {
    pub host: Option<String>,
    pub port: u16,
    pub use_ssl: bool,
    pub use_start_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bind_requires_dn: bool,
    pub base_dn: Option<String>,
    pub account_canonical_form: AccountCanonicalForm,
    pub account_domain_name: Option<String>,
    pub account_domain_name_short: Option<String>,
    pub allow_empty_password: bool,
    pub opt_referrals: bool,
    pub try_username_split: bool,
    /// Seconds; `None` leaves the library default in place.
    pub network_timeout: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            host: None,
            port: 0,
            use_ssl: false,
            use_start_tls: false,
            username: None,
            password: None,
            bind_requires_dn: false,
            base_dn: None,
            account_canonical_form: AccountCanonicalForm::Auto,
            account_domain_name: None,
            account_domain_name_short: None,
            allow_empty_password: false,
            opt_referrals: false,
            try_username_split: true,
            network_timeout: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_start_tls", &self.use_start_tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("bind_requires_dn", &self.bind_requires_dn)
            .field("base_dn", &self.base_dn)
            .field("account_canonical_form", &self.account_canonical_form)
            .field("account_domain_name", &self.account_domain_name)
            .field("account_domain_name_short", &self.account_domain_name_short)
            .field("allow_empty_password", &self.allow_empty_password)
            .field("opt_referrals", &self.opt_referrals)
            .field("try_username_split", &self.try_username_split)
            .field("network_timeout", &self.network_timeout)
            .finish()
    }
}

/// Lenient boolean parsing: `1/true/yes/on` and `0/false/no/off/""`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// `useSsl`, `use_ssl` and `USESSL` all name the same option.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from string key/value pairs, starting from the defaults.
    pub fn from_pairs<I, K, V>(pairs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key.as_ref(), value.as_ref())?;
        }
        Ok(options)
    }

    /// Sets one option by its name, coercing the string value.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let invalid =
            || LdapError::usage(format!("Invalid value for option {}: {}", key, value));
        let as_bool = || parse_bool(value).ok_or_else(invalid);

        match normalize_key(key).as_str() {
            "host" => self.host = non_empty(value),
            "port" => {
                self.port = if value.trim().is_empty() {
                    0
                } else {
                    value.trim().parse().map_err(|_| invalid())?
                }
            }
            "usessl" => self.use_ssl = as_bool()?,
            "usestarttls" => self.use_start_tls = as_bool()?,
            "username" => self.username = non_empty(value),
            "password" => self.password = Some(value.to_string()),
            "bindrequiresdn" => self.bind_requires_dn = as_bool()?,
            "basedn" => self.base_dn = non_empty(value),
            "accountcanonicalform" => {
                self.account_canonical_form =
                    AccountCanonicalForm::parse(value).ok_or_else(invalid)?
            }
            "accountdomainname" => self.account_domain_name = non_empty(value),
            "accountdomainnameshort" => self.account_domain_name_short = non_empty(value),
            "allowemptypassword" => self.allow_empty_password = as_bool()?,
            "optreferrals" => self.opt_referrals = as_bool()?,
            "tryusernamesplit" => self.try_username_split = as_bool()?,
            "networktimeout" => {
                let seconds: u64 = if value.trim().is_empty() {
                    0
                } else {
                    value.trim().parse().map_err(|_| invalid())?
                };
                self.network_timeout = (seconds > 0).then_some(seconds);
            }
            _ => return Err(LdapError::usage(format!("Unknown option: {}", key))),
        }
        Ok(())
    }

    /// Loads options from a yaml, toml or json file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(LdapError::Config(format!(
                "Options file not found: {}",
                path.display()
            )));
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        let table = settings.try_deserialize::<HashMap<String, ::config::Value>>()?;

        let mut pairs = Vec::with_capacity(table.len());
        for (key, value) in table {
            let value = value.into_string()?;
            pairs.push((key, value));
        }
        Self::from_pairs(pairs)
    }

    pub fn from_cli_args(args: &CliArgs) -> crate::Result<Self> {
        let mut options = match &args.file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = &args.host {
            options.host = Some(host.clone());
        }
        if args.port != 0 {
            options.port = args.port;
        }
        if args.use_ssl {
            options.use_ssl = true;
        }
        if args.use_start_tls {
            options.use_start_tls = true;
        }
        if let Some(timeout) = args.network_timeout {
            options.network_timeout = (timeout > 0).then_some(timeout);
        }
        if let Some(dn) = &args.bind_dn {
            options.username = Some(dn.clone());
        }
        if let Some(password) = &args.password {
            options.password = Some(password.clone());
        }

        Ok(options)
    }
}

// Raw variables, all optional strings so that empty values can be told apart.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OnlineVars {
    online_enabled: Option<String>,
    host: Option<String>,
    port: Option<String>,
    use_ssl: Option<String>,
    network_timeout: Option<String>,
}

/// Connection parameters for the online test suite, read from
/// `TESTS_LDAPCONN_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct OnlineSettings {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub use_ssl: bool,
    pub network_timeout: Option<u64>,
}

impl OnlineSettings {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_environment(::config::Environment::with_prefix(ONLINE_ENV_PREFIX))
    }

    pub fn from_env_prefix(prefix: &str) -> crate::Result<Self> {
        Self::from_environment(::config::Environment::with_prefix(prefix))
    }

    /// Same as [`OnlineSettings::from_env`] with the variables supplied
    /// directly, keyed without the prefix (`HOST`, `PORT`, ...).
    pub fn from_vars(vars: HashMap<String, String>) -> crate::Result<Self> {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (format!("{}_{}", ONLINE_ENV_PREFIX, k), v))
            .collect();
        Self::from_environment(
            ::config::Environment::with_prefix(ONLINE_ENV_PREFIX).source(Some(vars)),
        )
    }

    fn from_environment(env: ::config::Environment) -> crate::Result<Self> {
        let settings = ::config::Config::builder().add_source(env).build()?;
        let vars: OnlineVars = settings.try_deserialize()?;

        // Unset, empty and "0" all read as off.
        let flag = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| parse_bool(v).unwrap_or(true))
                .unwrap_or(false)
        };
        let number = |key: &str, value: &Option<String>| -> crate::Result<Option<u64>> {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(v) => v.parse().map(Some).map_err(|_| {
                    LdapError::Config(format!("Invalid value for {}: {}", key, v))
                }),
                None => Ok(None),
            }
        };

        let port = match number("port", &vars.port)? {
            Some(port) => Some(u16::try_from(port).map_err(|_| {
                LdapError::Config(format!("Invalid value for port: {}", port))
            })?),
            None => None,
        };

        Ok(Self {
            enabled: flag(&vars.online_enabled),
            host: vars.host.as_deref().and_then(non_empty),
            port: port.filter(|p| *p != 0),
            use_ssl: flag(&vars.use_ssl),
            network_timeout: number("network_timeout", &vars.network_timeout)?.filter(|t| *t > 0),
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Port to pass explicitly, leaving the default port implicit.
    pub fn explicit_port(&self) -> Option<u16> {
        self.port.filter(|p| *p != DEFAULT_PORT)
    }

    /// The options bag for the online suite: the host always, the port
    /// only when it is not 389, and `useSsl` only when set.
    pub fn options(&self) -> Options {
        let mut options = Options {
            host: self.host.clone(),
            ..Options::default()
        };
        if let Some(port) = self.explicit_port() {
            options.port = port;
        }
        if self.use_ssl {
            options.use_ssl = true;
        }
        options
    }

    /// `ldap://host[:port]` or `ldaps://host[:port]` for this server.
    pub fn uri(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        let host = self.host.as_deref().unwrap_or_default();
        match self.explicit_port() {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        }
    }
}
