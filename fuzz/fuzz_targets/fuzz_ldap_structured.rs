#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use bytes::{BufMut, BytesMut};
use libfuzzer_sys::fuzz_target;
use ldapconn::ldap::SimpleLdapCodec;
use tokio_util::codec::{Decoder, Encoder};

// Semi-valid LDAP envelopes around the operations the stub server handles
#[derive(Arbitrary, Debug)]
struct FuzzLdapMessage {
    sequence_tag: u8,
    length: FuzzLength,
    message_id: FuzzInteger,
    operation: FuzzOperation,
    controls: Option<Vec<u8>>,
}

#[derive(Arbitrary, Debug)]
enum FuzzLength {
    Exact,
    Short(u8),
    Long { num_octets: u8, value: u32 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInteger {
    tag: u8,
    length: u8,
    value: u32,
}

#[derive(Arbitrary, Debug)]
enum FuzzOperation {
    BindRequest {
        tag: u8,
        version: u8,
        dn: Vec<u8>,
        auth_choice: u8,
        password: Vec<u8>,
    },
    UnbindRequest {
        tag: u8,
    },
    Random {
        tag: u8,
        data: Vec<u8>,
    },
}

fn put_tlv(buf: &mut BytesMut, tag: u8, value: &[u8]) {
    let value = &value[..value.len().min(127)];
    buf.put_u8(tag);
    buf.put_u8(value.len() as u8);
    buf.put_slice(value);
}

impl FuzzLdapMessage {
    fn to_bytes(&self) -> BytesMut {
        let mut body = BytesMut::new();

        // Message ID
        body.put_u8(self.message_id.tag);
        body.put_u8(self.message_id.length);
        body.put_u32(self.message_id.value);

        match &self.operation {
            FuzzOperation::BindRequest {
                tag,
                version,
                dn,
                auth_choice,
                password,
            } => {
                let mut op = BytesMut::new();
                put_tlv(&mut op, 0x02, &[*version]);
                put_tlv(&mut op, 0x04, dn);
                put_tlv(&mut op, *auth_choice, password);
                put_tlv(&mut body, *tag, &op);
            }
            FuzzOperation::UnbindRequest { tag } => {
                body.put_u8(*tag);
                body.put_u8(0x00);
            }
            FuzzOperation::Random { tag, data } => {
                put_tlv(&mut body, *tag, data);
            }
        }

        if let Some(controls) = &self.controls {
            put_tlv(&mut body, 0xa0, controls);
        }

        let mut buf = BytesMut::new();
        buf.put_u8(self.sequence_tag);
        match &self.length {
            FuzzLength::Exact => {
                let len = body.len();
                if len < 0x80 {
                    buf.put_u8(len as u8);
                } else {
                    buf.put_u8(0x82);
                    buf.put_u16(len as u16);
                }
            }
            FuzzLength::Short(len) => buf.put_u8(*len),
            FuzzLength::Long { num_octets, value } => {
                let num_octets = num_octets & 0x07;
                buf.put_u8(0x80 | num_octets);
                for i in (0..num_octets.min(4)).rev() {
                    buf.put_u8((value >> (i * 8)) as u8);
                }
            }
        }
        buf.extend_from_slice(&body);
        buf
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    if let Ok(msg) = FuzzLdapMessage::arbitrary(&mut u) {
        let mut buf = msg.to_bytes();

        let mut codec = SimpleLdapCodec;
        if let Ok(Some(decoded)) = codec.decode(&mut buf) {
            // Whatever decodes must be something the codec can answer
            let mut out = BytesMut::new();
            let _ = codec.encode(decoded, &mut out);
        }
    }
});
