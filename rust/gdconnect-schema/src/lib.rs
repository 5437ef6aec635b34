#![deny(unsafe_code)]

//! Resolved schema graph consumed by the gdconnect generator.
//!
//! The graph is produced by an external loader (typically from protobuf
//! descriptors) and arrives fully resolved and validated; nothing here
//! checks for dangling references. All types are plain data with serde
//! derives so a host can hand the graph over as a JSON document.

use serde::{Deserialize, Serialize};

/// A whole generation input: every schema file of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub files: Vec<SchemaFile>,
}

/// One schema file. Identity is the schema-relative path in `name`
/// (e.g. `helloworld/v1/hello.proto`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name: String,
    /// Dotted package identifier, e.g. `helloworld.v1`.
    pub package: String,
    pub services: Vec<Service>,
}

/// A service declaration. The routing path (`package.ServiceName`) is part
/// of the wire contract and must round-trip verbatim; see
/// [`SchemaFile::routing_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Request message fields, in declaration order.
    pub request: Vec<Field>,
    /// Response message fields, in declaration order.
    pub response: Vec<Field>,
    /// True when the schema marks the method server-streaming.
    #[serde(default)]
    pub server_streaming: bool,
    /// True only when the schema explicitly annotates the method as having
    /// no side effects. Never inferred from naming.
    #[serde(default)]
    pub idempotent: bool,
}

/// One message field. `wire_name` (not `name`) is the literal JSON key on
/// the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub wire_name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeated: bool,
}

/// Schema primitive kinds, plus a catch-all for kinds this generator does
/// not recognize. Unknown kinds degrade to a dynamic target type rather
/// than failing generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    Bool,
    Message,
    Other(String),
}

/// The call shape of a method, derived from its streaming and idempotency
/// annotations. The shape alone determines the HTTP method, where the
/// request payload travels, and which runtime entry point the generated
/// stub dispatches through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Unary, explicitly side-effect-free: eligible for GET transport.
    UnaryIdempotent,
    /// Unary, default shape: POST with a JSON body.
    UnaryMutating,
    /// Server-streaming: enveloped POST, ordered event sequence back.
    Streaming,
}

impl Method {
    /// Classify this method. Streaming takes precedence over idempotency;
    /// a method with neither annotation is unary-mutating.
    pub fn call_shape(&self) -> CallShape {
        if self.server_streaming {
            CallShape::Streaming
        } else if self.idempotent {
            CallShape::UnaryIdempotent
        } else {
            CallShape::UnaryMutating
        }
    }
}

impl SchemaFile {
    /// Fully-qualified routing path for a service declared in this file,
    /// `package "." service-name`, preserved exactly as declared.
    pub fn routing_path(&self, service: &Service) -> String {
        format!("{}.{}", self.package, service.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(streaming: bool, idempotent: bool) -> Method {
        Method {
            name: "M".into(),
            request: vec![],
            response: vec![],
            server_streaming: streaming,
            idempotent,
        }
    }

    #[test]
    fn streaming_wins_over_idempotency() {
        assert_eq!(method(true, true).call_shape(), CallShape::Streaming);
        assert_eq!(method(true, false).call_shape(), CallShape::Streaming);
    }

    #[test]
    fn idempotent_unary_requires_explicit_flag() {
        assert_eq!(method(false, true).call_shape(), CallShape::UnaryIdempotent);
        assert_eq!(method(false, false).call_shape(), CallShape::UnaryMutating);
    }

    #[test]
    fn routing_path_is_verbatim() {
        let file = SchemaFile {
            name: "helloworld/v1/hello.proto".into(),
            package: "helloworld.v1".into(),
            services: vec![Service {
                name: "HelloWorldService".into(),
                methods: vec![],
            }],
        };
        assert_eq!(
            file.routing_path(&file.services[0]),
            "helloworld.v1.HelloWorldService"
        );
    }

    #[test]
    fn annotations_default_to_absent_in_json() {
        let json = r#"{
            "name": "Ping",
            "request": [],
            "response": []
        }"#;
        let m: Method = serde_json::from_str(json).unwrap();
        assert!(!m.server_streaming);
        assert!(!m.idempotent);
        assert_eq!(m.call_shape(), CallShape::UnaryMutating);
    }

    #[test]
    fn unknown_kind_round_trips_through_catch_all() {
        let f: Field = serde_json::from_str(
            r#"{"name":"blob","wire_name":"blob","kind":{"other":"bytes"}}"#,
        )
        .unwrap();
        assert_eq!(f.kind, FieldKind::Other("bytes".into()));
        assert!(!f.optional);
        assert!(!f.repeated);
    }
}
