// Minimal BER framing for the bind/unbind exchange served by the stub server.
// This implements just that subset of LDAP without full ASN.1 complexity.

use bytes::{Buf, BufMut, BytesMut};
use std::io::{self, Cursor};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use super::protocol::*;

const BER_INTEGER: u8 = 0x02;
const BER_OCTET_STRING: u8 = 0x04;
const BER_ENUMERATED: u8 = 0x0a;
const BER_SEQUENCE: u8 = 0x30;
const LDAP_BIND_REQUEST: u8 = 0x60;
const LDAP_BIND_RESPONSE: u8 = 0x61;
const LDAP_UNBIND_REQUEST: u8 = 0x42;
const LDAP_AUTH_SIMPLE: u8 = 0x80;

// Upper bound on a single message; binds are tiny.
const MAX_MESSAGE_LEN: usize = 64 * 1024;

pub struct SimpleLdapCodec;

impl SimpleLdapCodec {
    fn read_length(buf: &mut Cursor<&[u8]>) -> io::Result<usize> {
        if buf.remaining() < 1 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough data for length",
            ));
        }

        let first_byte = buf.get_u8();
        if first_byte & 0x80 == 0 {
            // Short form
            Ok(first_byte as usize)
        } else {
            // Long form
            let num_octets = (first_byte & 0x7f) as usize;
            if num_octets == 0 || num_octets > 4 || buf.remaining() < num_octets {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Invalid length encoding",
                ));
            }

            let mut length = 0usize;
            for _ in 0..num_octets {
                length = (length << 8) | (buf.get_u8() as usize);
            }
            Ok(length)
        }
    }

    fn write_length(buf: &mut BytesMut, length: usize) {
        if length < 128 {
            buf.put_u8(length as u8);
        } else if length < 256 {
            buf.put_u8(0x81);
            buf.put_u8(length as u8);
        } else if length < 65536 {
            buf.put_u8(0x82);
            buf.put_u16(length as u16);
        } else {
            buf.put_u8(0x83);
            buf.put_u8((length >> 16) as u8);
            buf.put_u8((length >> 8) as u8);
            buf.put_u8(length as u8);
        }
    }

    fn read_bytes(buf: &mut Cursor<&[u8]>, length: usize) -> io::Result<Vec<u8>> {
        if buf.remaining() < length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough data for value",
            ));
        }
        let mut bytes = vec![0u8; length];
        buf.copy_to_slice(&mut bytes);
        Ok(bytes)
    }

    fn read_string(buf: &mut Cursor<&[u8]>) -> io::Result<String> {
        if buf.remaining() < 1 || buf.get_u8() != BER_OCTET_STRING {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Expected OCTET STRING",
            ));
        }

        let length = Self::read_length(buf)?;
        let bytes = Self::read_bytes(buf, length)?;
        String::from_utf8(bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid UTF-8"))
    }

    fn write_string(buf: &mut BytesMut, s: &str) {
        buf.put_u8(BER_OCTET_STRING);
        Self::write_length(buf, s.len());
        buf.put_slice(s.as_bytes());
    }

    fn read_integer(buf: &mut Cursor<&[u8]>) -> io::Result<u32> {
        if buf.remaining() < 1 || buf.get_u8() != BER_INTEGER {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Expected INTEGER"));
        }

        let length = Self::read_length(buf)?;
        if length == 0 || length > 5 || buf.remaining() < length {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Invalid integer"));
        }

        let mut value = 0u64;
        for _ in 0..length {
            value = (value << 8) | (buf.get_u8() as u64);
        }
        u32::try_from(value)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Integer out of range"))
    }

    // Minimal two's complement encoding of a non-negative value.
    fn write_unsigned(buf: &mut BytesMut, tag: u8, value: u32) {
        let bytes = value.to_be_bytes();
        let mut start = bytes.iter().position(|b| *b != 0).unwrap_or(3);
        if bytes[start] & 0x80 != 0 {
            buf.put_u8(tag);
            buf.put_u8((4 - start + 1) as u8);
            buf.put_u8(0);
        } else {
            buf.put_u8(tag);
            buf.put_u8((4 - start) as u8);
        }
        while start < 4 {
            buf.put_u8(bytes[start]);
            start += 1;
        }
    }

    fn decode_bind_request(cursor: &mut Cursor<&[u8]>) -> io::Result<LdapProtocolOp> {
        let _length = Self::read_length(cursor)?;
        let version = u8::try_from(Self::read_integer(cursor)?).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "Bind version out of range")
        })?;
        let dn = Self::read_string(cursor)?;

        let authentication = if cursor.remaining() > 0 {
            let auth_tag = cursor.get_u8();
            let auth_len = Self::read_length(cursor)?;
            let credentials = Self::read_bytes(cursor, auth_len)?;
            if auth_tag == LDAP_AUTH_SIMPLE {
                let password = String::from_utf8(credentials)
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid UTF-8"))?;
                if dn.is_empty() && password.is_empty() {
                    BindAuthentication::Anonymous
                } else {
                    BindAuthentication::Simple(password)
                }
            } else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Unsupported authentication choice: 0x{:02x}", auth_tag),
                ));
            }
        } else {
            BindAuthentication::Anonymous
        };

        Ok(LdapProtocolOp::BindRequest {
            version,
            dn,
            authentication,
        })
    }
}

impl Decoder for SimpleLdapCodec {
    type Item = LdapMessage;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 2 {
            return Ok(None);
        }

        if src[0] != BER_SEQUENCE {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Expected SEQUENCE"));
        }

        let (msg_length, header_len) = if src[1] & 0x80 == 0 {
            (src[1] as usize, 2)
        } else {
            let num_octets = (src[1] & 0x7f) as usize;
            if num_octets == 0 || num_octets > 4 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Invalid length encoding",
                ));
            }
            if src.len() < 2 + num_octets {
                return Ok(None);
            }

            let mut length = 0usize;
            for i in 0..num_octets {
                length = (length << 8) | (src[2 + i] as usize);
            }
            (length, 2 + num_octets)
        };

        if msg_length > MAX_MESSAGE_LEN {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Message too large"));
        }

        let total_len = header_len + msg_length;
        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let mut cursor = Cursor::new(&src[..total_len]);
        cursor.set_position(header_len as u64);

        let message_id = Self::read_integer(&mut cursor)?;

        if cursor.remaining() < 1 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Missing protocol operation",
            ));
        }
        let op_tag = cursor.get_u8();

        debug!("Received LDAP message: id={}, op_tag=0x{:02x}", message_id, op_tag);

        let protocol_op = match op_tag {
            LDAP_BIND_REQUEST => Self::decode_bind_request(&mut cursor)?,
            LDAP_UNBIND_REQUEST => LdapProtocolOp::UnbindRequest,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Unsupported operation tag: 0x{:02x}", op_tag),
                ));
            }
        };

        // trailing controls are ignored
        src.advance(total_len);

        Ok(Some(LdapMessage {
            message_id,
            protocol_op,
        }))
    }
}

impl Encoder<LdapMessage> for SimpleLdapCodec {
    type Error = io::Error;

    fn encode(&mut self, item: LdapMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut content = BytesMut::new();

        Self::write_unsigned(&mut content, BER_INTEGER, item.message_id);

        match item.protocol_op {
            LdapProtocolOp::BindResponse { ref result } => {
                let mut bind_content = BytesMut::new();

                Self::write_unsigned(&mut bind_content, BER_ENUMERATED, result.result_code as u32);
                Self::write_string(&mut bind_content, &result.matched_dn);
                Self::write_string(&mut bind_content, &result.diagnostic_message);

                content.put_u8(LDAP_BIND_RESPONSE);
                Self::write_length(&mut content, bind_content.len());
                content.put(bind_content);
            }

            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Unsupported operation for encoding",
                ));
            }
        }

        dst.reserve(content.len() + 6);
        dst.put_u8(BER_SEQUENCE);
        Self::write_length(dst, content.len());
        dst.put(content);

        Ok(())
    }
}
