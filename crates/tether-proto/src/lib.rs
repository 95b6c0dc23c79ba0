//! gRPC protocol definitions for Tether.
//!
//! This crate provides the wire messages and the generated client/server
//! stubs for the single `tether.v1.TransactionManager/StartTransaction`
//! method spoken between session drivers and servers.

/// Metadata key carrying the client instance identity on every call.
pub const INSTANCE_ID_KEY: &str = "instance-id";

pub mod tether {
    pub mod v1 {
        tonic::include_proto!("tether.v1");
    }
}

// Re-export commonly used types for convenience
pub use tether::v1::*;

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_default_reply_means_no_change() {
        assert_eq!(Reply::default().disconnect, 0);
    }

    #[test]
    fn test_query_wire_encoding() {
        let bytes = Query { id: 3 }.encode_to_vec();
        // field 1, varint
        assert_eq!(bytes, vec![0x08, 0x03]);
    }

    #[test]
    fn test_negative_hint_survives_decode() {
        let bytes = Reply { disconnect: -1 }.encode_to_vec();
        let decoded = Reply::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.disconnect, -1);
    }

    #[test]
    fn test_truncated_reply_is_a_decode_error() {
        assert!(Reply::decode(&[0x08][..]).is_err());
    }
}
