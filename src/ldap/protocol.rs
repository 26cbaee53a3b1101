use super::codes::ResultCode;

pub type LdapMessageId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct LdapMessage {
    pub message_id: LdapMessageId,
    pub protocol_op: LdapProtocolOp,
}

/// The bind/unbind subset of LDAPv3 operations understood by the stub server.
#[derive(Debug, Clone, PartialEq)]
pub enum LdapProtocolOp {
    BindRequest {
        version: u8,
        dn: String,
        authentication: BindAuthentication,
    },
    BindResponse {
        result: LdapResult,
    },
    UnbindRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindAuthentication {
    Simple(String), // password
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdapResult {
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
}

impl LdapResult {
    pub fn success() -> Self {
        Self {
            result_code: ResultCode::Success,
            matched_dn: String::new(),
            diagnostic_message: String::new(),
        }
    }

    pub fn error(code: ResultCode, message: String) -> Self {
        Self {
            result_code: code,
            matched_dn: String::new(),
            diagnostic_message: message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ldap_result_success() {
        let result = LdapResult::success();
        assert_eq!(result.result_code, ResultCode::Success);
        assert_eq!(result.matched_dn, "");
        assert_eq!(result.diagnostic_message, "");
    }

    #[test]
    fn test_ldap_result_error() {
        let result = LdapResult::error(ResultCode::InvalidCredentials, String::new());
        assert_eq!(result.result_code, ResultCode::InvalidCredentials);
        assert_eq!(result.diagnostic_message, "");
    }

    #[test]
    fn test_bind_authentication_variants() {
        let simple = BindAuthentication::Simple("password".to_string());
        match simple {
            BindAuthentication::Simple(pwd) => assert_eq!(pwd, "password"),
            _ => panic!("Expected Simple authentication"),
        }
        assert_ne!(
            BindAuthentication::Anonymous,
            BindAuthentication::Simple(String::new())
        );
    }
}
