use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ldapconn::client::account::canonical_account_name;
use ldapconn::config::AccountCanonicalForm;
use ldapconn::ldap::{is_dn, SimpleLdapCodec};
use ldapconn::Options;
use tokio_util::codec::Decoder;

// BindRequest for "cn=admin,dc=t" / "secret", message id 1
const BIND_ADMIN: &[u8] = &[
    0x30, 0x1f, 0x02, 0x01, 0x01, 0x60, 0x1a, 0x02, 0x01, 0x03, 0x04, 0x0d, b'c', b'n', b'=',
    b'a', b'd', b'm', b'i', b'n', b',', b'd', b'c', b'=', b't', 0x80, 0x06, b's', b'e', b'c',
    b'r', b'e', b't',
];

fn create_dn(depth: usize) -> String {
    let mut rdns = vec!["uid=user500".to_string()];
    for i in 0..depth {
        rdns.push(format!("ou=unit{}", i));
    }
    rdns.push("dc=example".to_string());
    rdns.push("dc=com".to_string());
    rdns.join(",")
}

fn benchmark_is_dn(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_dn");

    for depth in [1, 10, 100].iter() {
        let dn = create_dn(*depth);

        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| is_dn(black_box(&dn)));
        });
    }

    group.finish();
}

fn benchmark_options_from_pairs(c: &mut Criterion) {
    let pairs = [
        ("host", "ldap.example.com"),
        ("port", "1389"),
        ("useStartTls", "true"),
        ("username", "cn=admin,dc=example,dc=com"),
        ("password", "secret"),
        ("accountDomainName", "example.com"),
        ("accountCanonicalForm", "4"),
        ("networkTimeout", "5"),
    ];

    c.bench_function("options_from_pairs", |b| {
        b.iter(|| Options::from_pairs(black_box(pairs)));
    });
}

fn benchmark_canonical_account_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_account_name");

    for form in [AccountCanonicalForm::Backslash, AccountCanonicalForm::Principal] {
        let options = Options {
            account_domain_name: Some("example.com".to_string()),
            account_domain_name_short: Some("EXAMPLE".to_string()),
            account_canonical_form: form,
            ..Options::default()
        };

        group.bench_function(format!("{:?}", form), |b| {
            b.iter(|| canonical_account_name(&options, black_box("EXAMPLE\\jdoe")));
        });
    }

    group.finish();
}

fn benchmark_bind_request_decode(c: &mut Criterion) {
    c.bench_function("bind_request_decode", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(black_box(BIND_ADMIN));
            SimpleLdapCodec.decode(&mut buf)
        });
    });
}

criterion_group!(
    benches,
    benchmark_is_dn,
    benchmark_options_from_pairs,
    benchmark_canonical_account_name,
    benchmark_bind_request_decode
);
criterion_main!(benches);
