//! Shared runtime unit generation.
//!
//! Emits `connect_client.gd`, the base class every generated client
//! extends. It holds the per-instance base URL, the shared
//! `error_occurred` signal, one dispatch entry point per call shape, and
//! the streaming envelope scanner. Wire strings and flag bits come from
//! `gdconnect-wire`, so this unit and the Rust codec describe the same
//! protocol.
//!
//! Emission is deterministic: re-running produces byte-identical output,
//! so overwriting a previous run's unit is always safe.

use std::fmt;

use gdconnect_wire::envelope::{EnvelopeFlags, HEADER_LEN};
use gdconnect_wire::{
    CONTENT_TYPE_CONNECT_JSON, CONTENT_TYPE_JSON, DEFAULT_BASE_URL, HEADER_PROTOCOL_VERSION,
    PROTOCOL_VERSION,
};

use crate::code_writer::CodeWriter;
use crate::cw_writeln;

/// Generate the shared runtime unit.
pub fn generate_runtime() -> Result<String, fmt::Error> {
    let mut out = String::new();
    let mut w = CodeWriter::new(&mut out);
    let end_stream = EnvelopeFlags::END_STREAM.bits();

    w.comment("Connect-RPC client base class")?;
    w.comment("Generic protocol runtime; service clients extend this script")?;
    w.comment("Auto-generated - DO NOT EDIT")?;
    w.blank_line()?;
    w.writeln("extends Node")?;
    w.blank_line()?;
    w.writeln("signal error_occurred(error: String)")?;
    w.blank_line()?;
    cw_writeln!(w, "var base_url: String = \"{DEFAULT_BASE_URL}\"")?;
    w.blank_line()?;

    w.comment("Unary call over GET (idempotent methods only)")?;
    w.suite(
        "func call_unary_get(service_path: String, method: String, request_data: Dictionary, response_signal: String) -> void",
        |w| {
            w.writeln("var url = base_url + \"/\" + service_path + \"/\" + method")?;
            w.writeln(
                "var query_url = url + \"?encoding=json&message=\" + JSON.stringify(request_data).uri_encode()",
            )?;
            w.writeln("var http_request = _new_request(response_signal, _on_unary_response)")?;
            cw_writeln!(w, "var headers = [\"Accept: {CONTENT_TYPE_JSON}\"]")?;
            w.writeln("var error = http_request.request(query_url, headers, HTTPClient.METHOD_GET)")?;
            w.suite("if error != OK", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Failed to make GET request: \" + str(error))",
                )?;
                w.writeln("http_request.queue_free()")
            })
        },
    )?;
    w.blank_line()?;

    w.comment("Unary call over POST")?;
    w.suite(
        "func call_unary_post(service_path: String, method: String, request_data: Dictionary, response_signal: String) -> void",
        |w| {
            w.writeln("var url = base_url + \"/\" + service_path + \"/\" + method")?;
            w.writeln("var http_request = _new_request(response_signal, _on_unary_response)")?;
            w.writeln("var headers = [")?;
            {
                let _indent = w.indent();
                cw_writeln!(w, "\"Content-Type: {CONTENT_TYPE_JSON}\",")?;
                cw_writeln!(w, "\"Accept: {CONTENT_TYPE_JSON}\",")?;
            }
            w.writeln("]")?;
            w.writeln(
                "var error = http_request.request(url, headers, HTTPClient.METHOD_POST, JSON.stringify(request_data))",
            )?;
            w.suite("if error != OK", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Failed to make POST request: \" + str(error))",
                )?;
                w.writeln("http_request.queue_free()")
            })
        },
    )?;
    w.blank_line()?;

    w.comment("Server-streaming call: enveloped POST, events scanned from the body")?;
    w.suite(
        "func call_streaming(service_path: String, method: String, request_data: Dictionary, event_signal: String) -> void",
        |w| {
            w.writeln("var url = base_url + \"/\" + service_path + \"/\" + method")?;
            w.writeln("var body = _encode_envelope(JSON.stringify(request_data))")?;
            w.writeln("var http_request = _new_request(event_signal, _on_streaming_response)")?;
            w.writeln("var headers = [")?;
            {
                let _indent = w.indent();
                cw_writeln!(w, "\"Content-Type: {CONTENT_TYPE_CONNECT_JSON}\",")?;
                cw_writeln!(w, "\"Accept: {CONTENT_TYPE_CONNECT_JSON}\",")?;
                cw_writeln!(w, "\"{HEADER_PROTOCOL_VERSION}: {PROTOCOL_VERSION}\",")?;
                cw_writeln!(w, "\"Cache-Control: no-cache\",")?;
            }
            w.writeln("]")?;
            w.writeln(
                "var error = http_request.request_raw(url, headers, HTTPClient.METHOD_POST, body)",
            )?;
            w.suite("if error != OK", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Failed to start stream: \" + str(error))",
                )?;
                w.writeln("http_request.queue_free()")
            })
        },
    )?;
    w.blank_line()?;

    w.comment("One HTTPRequest node per call, freed by the completion handler")?;
    w.suite("func _new_request(signal_name: String, handler: Callable) -> HTTPRequest", |w| {
        w.writeln("var http_request = HTTPRequest.new()")?;
        w.writeln("add_child(http_request)")?;
        w.writeln("http_request.request_completed.connect(")?;
        {
            let _indent = w.indent();
            w.writeln("func(_result: int, response_code: int, _headers: PackedStringArray, body: PackedByteArray):")?;
            {
                let _indent = w.indent();
                w.writeln("handler.call(http_request, signal_name, response_code, body)")?;
            }
        }
        w.writeln(")")?;
        w.writeln("return http_request")
    })?;
    w.blank_line()?;

    w.suite(
        "func _on_unary_response(http_request: HTTPRequest, response_signal: String, response_code: int, body: PackedByteArray) -> void",
        |w| {
            w.writeln("http_request.queue_free()")?;
            w.suite("if response_code != 200", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Request failed with code: \" + str(response_code))",
                )?;
                w.writeln("return")
            })?;
            w.writeln("var json = JSON.new()")?;
            w.suite("if json.parse(body.get_string_from_utf8()) != OK", |w| {
                w.writeln("emit_signal(\"error_occurred\", \"Failed to parse response JSON\")")?;
                w.writeln("return")
            })?;
            w.writeln("emit_signal(response_signal, json.data)")
        },
    )?;
    w.blank_line()?;

    w.suite(
        "func _on_streaming_response(http_request: HTTPRequest, event_signal: String, response_code: int, body: PackedByteArray) -> void",
        |w| {
            w.writeln("http_request.queue_free()")?;
            w.suite("if response_code != 200", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Stream request failed with code: \" + str(response_code))",
                )?;
                w.writeln("return")
            })?;
            w.writeln("_scan_stream(body, event_signal)")
        },
    )?;
    w.blank_line()?;

    w.comment("Wrap one JSON message in an envelope frame:")?;
    w.comment("1 flag byte (0: uncompressed, non-terminal) + 4-byte big-endian length + payload")?;
    w.suite("func _encode_envelope(json_message: String) -> PackedByteArray", |w| {
        w.writeln("var message_bytes = json_message.to_utf8_buffer()")?;
        w.writeln("var length = message_bytes.size()")?;
        w.writeln("var envelope = PackedByteArray()")?;
        w.writeln("envelope.append(0)")?;
        w.writeln("envelope.append((length >> 24) & 0xFF)")?;
        w.writeln("envelope.append((length >> 16) & 0xFF)")?;
        w.writeln("envelope.append((length >> 8) & 0xFF)")?;
        w.writeln("envelope.append(length & 0xFF)")?;
        w.writeln("envelope.append_array(message_bytes)")?;
        w.writeln("return envelope")
    })?;
    w.blank_line()?;

    w.comment("Scan a response body for envelope frames, emitting one event per")?;
    w.comment("data frame in order. A final-flagged frame ends the scan; an")?;
    w.comment("empty-object trailer is swallowed, an error trailer is reported.")?;
    w.suite("func _scan_stream(bytes: PackedByteArray, event_signal: String) -> void", |w| {
        w.writeln("var offset = 0")?;
        cw_writeln!(w, "while bytes.size() - offset >= {HEADER_LEN}:")?;
        {
            let _indent = w.indent();
            w.writeln("var flags = bytes[offset]")?;
            w.writeln(
                "var length = (bytes[offset + 1] << 24) | (bytes[offset + 2] << 16) | (bytes[offset + 3] << 8) | bytes[offset + 4]",
            )?;
            cw_writeln!(w, "offset += {HEADER_LEN}")?;
            w.suite("if length > bytes.size() - offset", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Incomplete frame: declared \" + str(length) + \" bytes, got \" + str(bytes.size() - offset))",
                )?;
                w.writeln("return")
            })?;
            w.writeln("var payload = bytes.slice(offset, offset + length)")?;
            w.writeln("offset += length")?;
            cw_writeln!(w, "var is_final = (flags & {end_stream}) == {end_stream}")?;
            w.writeln("var json = JSON.new()")?;
            w.suite("if json.parse(payload.get_string_from_utf8()) != OK", |w| {
                w.writeln(
                    "emit_signal(\"error_occurred\", \"Failed to parse frame JSON: \" + payload.get_string_from_utf8())",
                )
            })?;
            w.suite("else", |w| {
                w.writeln("var data = json.data")?;
                w.suite("if is_final and data is Dictionary and data.has(\"error\")", |w| {
                    w.writeln(
                        "emit_signal(\"error_occurred\", \"Stream ended with error trailer: \" + JSON.stringify(data[\"error\"]))",
                    )
                })?;
                w.suite("elif is_final and data is Dictionary and data.is_empty()", |w| {
                    w.writeln("pass")
                })?;
                w.suite("else", |w| w.writeln("emit_signal(event_signal, data)"))
            })?;
            w.suite("if is_final", |w| w.writeln("return"))?;
        }
        Ok(())
    })?;
    w.blank_line()?;

    w.suite("func set_base_url(url: String) -> void", |w| {
        w.writeln("base_url = url")
    })?;
    w.blank_line()?;
    w.suite("func get_base_url() -> String", |w| w.writeln("return base_url"))?;

    drop(w);
    Ok(out)
}
