//! Per-schema-file client unit generation.
//!
//! Each generated script extends the shared runtime, declares one result
//! signal per method, and emits one callable stub per method that builds
//! the outgoing message object and dispatches through the runtime entry
//! point selected by the method's call shape.

use std::fmt;

use gdconnect_schema::{CallShape, Method, SchemaFile};

use crate::code_writer::CodeWriter;
use crate::{cw_writeln, render};

use super::types;

/// Generate the client unit for one schema file.
///
/// Callers are expected to skip files without services; a file with none
/// still renders, just to an empty shell.
pub fn generate_client(file: &SchemaFile) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let mut w = CodeWriter::new(&mut out);

    let file_base = file.name.rsplit('/').next().unwrap_or(&file.name);
    w.comment(&format!("Generated from {file_base}"))?;
    w.comment(&format!("Connect-RPC clients for package {}", file.package))?;
    w.comment("Auto-generated - DO NOT EDIT")?;
    w.blank_line()?;
    cw_writeln!(
        w,
        "extends \"{}\"",
        render::runtime_relative_path(&file.name, super::RUNTIME_UNIT_PATH)
    )?;
    w.blank_line()?;

    for service in &file.services {
        for method in &service.methods {
            match method.call_shape() {
                CallShape::Streaming => cw_writeln!(
                    w,
                    "signal {}(event: Dictionary)",
                    render::event_signal(&method.name)
                )?,
                CallShape::UnaryIdempotent | CallShape::UnaryMutating => cw_writeln!(
                    w,
                    "signal {}(response: Dictionary)",
                    render::response_signal(&method.name)
                )?,
            }
        }
    }

    for service in &file.services {
        let routing_path = file.routing_path(service);
        for method in &service.methods {
            w.blank_line()?;
            emit_method(&mut w, &routing_path, method)?;
        }
    }

    drop(w);
    Ok(out)
}

fn emit_method(
    w: &mut CodeWriter<&mut String>,
    routing_path: &str,
    method: &Method,
) -> fmt::Result {
    let shape = method.call_shape();
    match shape {
        CallShape::Streaming => w.comment(&format!("{} - streaming RPC", method.name))?,
        CallShape::UnaryIdempotent => w.comment(&format!(
            "{} - unary RPC (idempotent, GET transport)",
            method.name
        ))?,
        CallShape::UnaryMutating => w.comment(&format!("{} - unary RPC", method.name))?,
    }
    if !method.response.is_empty() {
        let fields: Vec<String> = method
            .response
            .iter()
            .map(|f| format!("{}: {}", f.wire_name, types::field_type(f).name()))
            .collect();
        w.comment(&format!("Response: {{ {} }}", fields.join(", ")))?;
    }

    let mut header = format!("func {}(", render::to_call_identifier(&method.name));
    for (i, field) in method.request.iter().enumerate() {
        if i > 0 {
            header.push_str(", ");
        }
        let ty = types::field_type(field);
        header.push_str(&format!(
            "{}: {}",
            render::to_call_identifier(&field.name),
            ty.name()
        ));
        if field.optional {
            header.push_str(&format!(" = {}", ty.default_literal()));
        }
    }
    header.push_str(") -> void");

    w.suite(&header, |w| {
        w.writeln("var request_data = {}")?;
        for field in &method.request {
            let param = render::to_call_identifier(&field.name);
            let assign = format!("request_data[\"{}\"] = {}", field.wire_name, param);
            if field.optional {
                // Omit-if-default: an optional field left at its default
                // never reaches the wire.
                let default = types::field_type(field).default_literal();
                w.suite(&format!("if {param} != {default}"), |w| w.writeln(&assign))?;
            } else {
                w.writeln(&assign)?;
            }
        }

        let (entry, signal) = match shape {
            CallShape::Streaming => ("call_streaming", render::event_signal(&method.name)),
            CallShape::UnaryIdempotent => ("call_unary_get", render::response_signal(&method.name)),
            CallShape::UnaryMutating => {
                ("call_unary_post", render::response_signal(&method.name))
            }
        };
        cw_writeln!(
            w,
            "{entry}(\"{routing_path}\", \"{}\", request_data, \"{signal}\")",
            method.name
        )
    })
}
