#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use ldapconn::ldap::SimpleLdapCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);
    let mut codec = SimpleLdapCodec;

    // Keep decoding until the buffer runs dry or an error ends the stream.
    while let Ok(Some(_msg)) = codec.decode(&mut buf) {}
});
