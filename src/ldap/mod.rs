pub mod codes;
pub mod dn;
pub mod protocol;
pub mod simple_protocol;

pub use codes::{describe, ResultCode};
pub use dn::is_dn;
pub use protocol::{BindAuthentication, LdapMessage, LdapMessageId, LdapProtocolOp, LdapResult};
pub use simple_protocol::SimpleLdapCodec;
