#![no_main]

use libfuzzer_sys::fuzz_target;
use ldapconn::client::account::{canonical_account_name, split_name};
use ldapconn::ldap::is_dn;
use ldapconn::Options;

fuzz_target!(|data: &[u8]| {
    if let Ok(name) = std::str::from_utf8(data) {
        let _ = is_dn(name);

        let (domain, account) = split_name(name);
        assert!(account.len() <= name.len());
        if let Some(domain) = domain {
            assert!(domain.len() < name.len());
        }

        let options = Options {
            account_domain_name: Some("example.com".to_string()),
            account_domain_name_short: Some("EXAMPLE".to_string()),
            ..Options::default()
        };
        let _ = canonical_account_name(&options, name);
    }
});
