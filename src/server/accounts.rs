use std::collections::HashMap;

use crate::ldap::protocol::{
    BindAuthentication, LdapMessage, LdapMessageId, LdapProtocolOp, LdapResult,
};
use crate::ldap::ResultCode;

/// Credentials the stub server accepts, keyed by DN (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct Accounts {
    passwords: HashMap<String, String>,
    allow_anonymous: bool,
}

impl Accounts {
    pub fn new(allow_anonymous: bool) -> Self {
        Self {
            passwords: HashMap::new(),
            allow_anonymous,
        }
    }

    pub fn with_account(mut self, dn: &str, password: &str) -> Self {
        self.add(dn, password);
        self
    }

    pub fn add(&mut self, dn: &str, password: &str) {
        self.passwords.insert(dn.to_lowercase(), password.to_string());
    }

    pub fn is_anonymous_allowed(&self) -> bool {
        self.allow_anonymous
    }

    pub fn authenticate(&self, dn: &str, auth: &BindAuthentication) -> LdapResult {
        match auth {
            BindAuthentication::Anonymous => {
                if self.allow_anonymous {
                    LdapResult::success()
                } else {
                    LdapResult::error(
                        ResultCode::InappropriateAuthentication,
                        "Anonymous bind not allowed".to_string(),
                    )
                }
            }
            BindAuthentication::Simple(password) => {
                match self.passwords.get(&dn.to_lowercase()) {
                    Some(stored) if !password.is_empty() && stored == password => {
                        LdapResult::success()
                    }
                    // unknown DN and wrong password look the same to the client
                    _ => LdapResult::error(ResultCode::InvalidCredentials, String::new()),
                }
            }
        }
    }
}

pub fn handle_bind_request(
    message_id: LdapMessageId,
    dn: &str,
    auth: &BindAuthentication,
    accounts: &Accounts,
) -> LdapMessage {
    LdapMessage {
        message_id,
        protocol_op: LdapProtocolOp::BindResponse {
            result: accounts.authenticate(dn, auth),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Accounts {
        Accounts::new(false).with_account("cn=admin,dc=test,dc=com", "secret")
    }

    #[test]
    fn test_valid_credentials() {
        let result = accounts().authenticate(
            "CN=Admin,DC=test,DC=com",
            &BindAuthentication::Simple("secret".to_string()),
        );
        assert_eq!(result.result_code, ResultCode::Success);
    }

    #[test]
    fn test_wrong_password_and_unknown_dn() {
        let accounts = accounts();
        let wrong = accounts.authenticate(
            "cn=admin,dc=test,dc=com",
            &BindAuthentication::Simple("nope".to_string()),
        );
        let unknown = accounts.authenticate(
            "CN=ignored,DC=example,DC=com",
            &BindAuthentication::Simple("ignored".to_string()),
        );
        assert_eq!(wrong.result_code, ResultCode::InvalidCredentials);
        assert_eq!(wrong, unknown);
    }

    #[test]
    fn test_anonymous_bind() {
        let denied = accounts().authenticate("", &BindAuthentication::Anonymous);
        assert_eq!(denied.result_code, ResultCode::InappropriateAuthentication);

        let allowed = Accounts::new(true).authenticate("", &BindAuthentication::Anonymous);
        assert_eq!(allowed.result_code, ResultCode::Success);
    }

    #[test]
    fn test_handle_bind_request_echoes_message_id() {
        let response = handle_bind_request(
            7,
            "cn=admin,dc=test,dc=com",
            &BindAuthentication::Simple("secret".to_string()),
            &accounts(),
        );
        assert_eq!(response.message_id, 7);
        assert!(matches!(
            response.protocol_op,
            LdapProtocolOp::BindResponse { ref result } if result.result_code == ResultCode::Success
        ));
    }
}
