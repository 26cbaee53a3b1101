use crate::config::{AccountCanonicalForm, Options};
use crate::ldap::ResultCode;
use crate::LdapError;

/// Splits `DOMAIN\user` and `user@domain` into `(domain, user)`. Separators
/// in the first position do not count.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    if let Some(pos) = name.find('@').filter(|p| *p > 0) {
        return (Some(&name[pos + 1..]), &name[..pos]);
    }
    if let Some(pos) = name.find('\\').filter(|p| *p > 0) {
        return (Some(&name[..pos]), &name[pos + 1..]);
    }
    (None, name)
}

fn is_possible_authority(options: &Options, domain: &str) -> bool {
    let long = options.account_domain_name.as_deref();
    let short = options.account_domain_name_short.as_deref();
    if long.is_none() && short.is_none() {
        return true;
    }
    [long, short]
        .into_iter()
        .flatten()
        .any(|d| d.eq_ignore_ascii_case(domain))
}

/// The form `Auto` settles on for these options.
pub fn resolve_form(options: &Options) -> AccountCanonicalForm {
    match options.account_canonical_form {
        AccountCanonicalForm::Auto => {
            if options.account_domain_name_short.is_some() {
                AccountCanonicalForm::Backslash
            } else if options.account_domain_name.is_some() {
                AccountCanonicalForm::Principal
            } else {
                AccountCanonicalForm::Username
            }
        }
        form => form,
    }
}

/// Rewrites a non-DN account name into the configured canonical form.
pub fn canonical_account_name(options: &Options, name: &str) -> crate::Result<String> {
    if !options.try_username_split {
        return Ok(name.to_string());
    }

    let (domain, account) = split_name(name);
    if let Some(domain) = domain {
        if !is_possible_authority(options, domain) {
            return Err(LdapError::usage_with_code(
                ResultCode::InvalidCredentials,
                format!("Binding domain is not an authority for user: {}", name),
            ));
        }
    }

    match resolve_form(options) {
        AccountCanonicalForm::Backslash => {
            let short = options
                .account_domain_name_short
                .as_deref()
                .ok_or_else(|| LdapError::usage("Option required: accountDomainNameShort"))?;
            Ok(format!("{}\\{}", short, account))
        }
        AccountCanonicalForm::Principal => {
            let long = options
                .account_domain_name
                .as_deref()
                .ok_or_else(|| LdapError::usage("Option required: accountDomainName"))?;
            Ok(format!("{}@{}", account, long))
        }
        AccountCanonicalForm::Dn => Err(LdapError::usage_with_code(
            ResultCode::NotSupported,
            "Account canonical form DN requires a directory search",
        )),
        AccountCanonicalForm::Username | AccountCanonicalForm::Auto => Ok(account.to_string()),
    }
}
