//! Request construction for the three call shapes.
//!
//! A [`RequestPlan`] is everything a transport needs to issue one call:
//! HTTP method, full URL, headers, and body. Planning is pure string and
//! byte assembly; transport initiation failures (bad socket, refused
//! connection) are the transport's to report, through the client's shared
//! error channel rather than any per-method channel.

use std::fmt::Write;

use gdconnect_schema::CallShape;
use http::Method;
use serde_json::Value;

use crate::envelope::encode_frame;
use crate::{
    CONTENT_TYPE_CONNECT_JSON, CONTENT_TYPE_JSON, HEADER_PROTOCOL_VERSION, PROTOCOL_VERSION,
};

/// A fully-assembled outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

/// Build the request for one call.
///
/// `service_path` is the fully-qualified routing path
/// (`package.ServiceName`), used verbatim; `message` is the outgoing
/// message object keyed by wire names.
pub fn plan(
    shape: CallShape,
    base_url: &str,
    service_path: &str,
    method_name: &str,
    message: &Value,
) -> RequestPlan {
    let url = format!("{base_url}/{service_path}/{method_name}");
    let json = message.to_string();

    match shape {
        CallShape::UnaryIdempotent => RequestPlan {
            method: Method::GET,
            url: format!("{url}?encoding=json&message={}", query_encode(&json)),
            headers: vec![("Accept", CONTENT_TYPE_JSON)],
            body: Vec::new(),
        },
        CallShape::UnaryMutating => RequestPlan {
            method: Method::POST,
            url,
            headers: vec![
                ("Content-Type", CONTENT_TYPE_JSON),
                ("Accept", CONTENT_TYPE_JSON),
            ],
            body: json.into_bytes(),
        },
        CallShape::Streaming => RequestPlan {
            method: Method::POST,
            url,
            headers: vec![
                ("Content-Type", CONTENT_TYPE_CONNECT_JSON),
                ("Accept", CONTENT_TYPE_CONNECT_JSON),
                (HEADER_PROTOCOL_VERSION, PROTOCOL_VERSION),
                ("Cache-Control", "no-cache"),
            ],
            body: encode_frame(json.as_bytes()).to_vec(),
        },
    }
}

/// Percent-encode a query parameter value. Everything outside the RFC
/// 3986 unreserved set is escaped.
fn query_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn idempotent_unary_travels_in_the_query_string() {
        let plan = plan(
            CallShape::UnaryIdempotent,
            "http://localhost:8080",
            "helloworld.v1.Greeter",
            "SayHello",
            &json!({"name": "world"}),
        );
        assert_eq!(plan.method, Method::GET);
        assert_eq!(
            plan.url,
            "http://localhost:8080/helloworld.v1.Greeter/SayHello\
             ?encoding=json&message=%7B%22name%22%3A%22world%22%7D"
        );
        assert_eq!(plan.headers, vec![("Accept", "application/json")]);
        assert!(plan.body.is_empty());
    }

    #[test]
    fn mutating_unary_travels_in_the_body() {
        let plan = plan(
            CallShape::UnaryMutating,
            "http://localhost:8080",
            "helloworld.v1.Greeter",
            "SetName",
            &json!({"name": "world"}),
        );
        assert_eq!(plan.method, Method::POST);
        assert_eq!(plan.url, "http://localhost:8080/helloworld.v1.Greeter/SetName");
        assert_eq!(plan.body, br#"{"name":"world"}"#);
        assert_eq!(
            plan.headers,
            vec![
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
            ]
        );
    }

    #[test]
    fn streaming_wraps_the_request_in_one_envelope() {
        let plan = plan(
            CallShape::Streaming,
            "http://localhost:8080",
            "helloworld.v1.Greeter",
            "Watch",
            &json!({"name": "world"}),
        );
        assert_eq!(plan.method, Method::POST);
        assert_eq!(plan.body[0], 0);
        assert_eq!(&plan.body[1..5], &16u32.to_be_bytes());
        assert_eq!(&plan.body[5..], br#"{"name":"world"}"#);
        assert!(
            plan.headers
                .contains(&("Connect-Protocol-Version", "1"))
        );
        assert!(plan.headers.contains(&("Cache-Control", "no-cache")));
        assert!(
            plan.headers
                .contains(&("Content-Type", "application/connect+json"))
        );
    }

    #[test]
    fn query_encoding_leaves_unreserved_characters_alone() {
        assert_eq!(query_encode("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
        assert_eq!(query_encode(r#"{"a b":1}"#), "%7B%22a%20b%22%3A1%7D");
    }
}
