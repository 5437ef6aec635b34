//! Name and path rendering shared by the GDScript target.

/// Convert an exported PascalCase identifier into the generated call
/// form: an underscore is inserted before every uppercase letter that is
/// not the first character, then everything is lowercased.
///
/// The per-letter rule is part of the generated contract: consecutive
/// capitals stay separated (`ID` becomes `i_d`), so general-purpose
/// acronym-collapsing case converters cannot be used here.
pub fn to_call_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Signal fired once with a unary method's decoded response.
pub fn response_signal(method_name: &str) -> String {
    format!("{}_response", to_call_identifier(method_name))
}

/// Signal fired per decoded event of a streaming method.
pub fn event_signal(method_name: &str) -> String {
    format!("{}_event", to_call_identifier(method_name))
}

/// Output path for a schema file's client unit: the schema-relative path
/// with its extension swapped for `.gd`.
pub fn client_unit_path(schema_name: &str) -> String {
    let stem_end = match schema_name.rfind('.') {
        Some(dot) if dot > schema_name.rfind('/').map_or(0, |slash| slash + 1) => dot,
        _ => schema_name.len(),
    };
    format!("{}.gd", &schema_name[..stem_end])
}

/// Relative path from a client unit back to the shared runtime unit at
/// the output root: one `..` per directory level of the client unit.
pub fn runtime_relative_path(schema_name: &str, runtime_unit: &str) -> String {
    let depth = schema_name.matches('/').count();
    let mut path = String::new();
    for _ in 0..depth {
        path.push_str("../");
    }
    path.push_str(runtime_unit);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_becomes_snake() {
        assert_eq!(to_call_identifier("SayHello"), "say_hello");
        assert_eq!(to_call_identifier("Watch"), "watch");
        assert_eq!(to_call_identifier("already_snake"), "already_snake");
    }

    #[test]
    fn consecutive_capitals_stay_separated() {
        assert_eq!(to_call_identifier("ID"), "i_d");
        assert_eq!(to_call_identifier("GetHTTP"), "get_h_t_t_p");
    }

    #[test]
    fn digits_and_lowercase_pass_through() {
        assert_eq!(to_call_identifier("SayHello2"), "say_hello2");
    }

    #[test]
    fn signal_names_pair_with_the_call_identifier() {
        assert_eq!(response_signal("SayHello"), "say_hello_response");
        assert_eq!(event_signal("Watch"), "watch_event");
    }

    #[test]
    fn client_unit_path_swaps_the_extension() {
        assert_eq!(
            client_unit_path("helloworld/v1/hello.proto"),
            "helloworld/v1/hello.gd"
        );
        assert_eq!(client_unit_path("hello.proto"), "hello.gd");
        assert_eq!(client_unit_path("no_extension"), "no_extension.gd");
    }

    #[test]
    fn runtime_path_climbs_one_level_per_directory() {
        assert_eq!(
            runtime_relative_path("helloworld/v1/hello.proto", "connect_client.gd"),
            "../../connect_client.gd"
        );
        assert_eq!(
            runtime_relative_path("hello.proto", "connect_client.gd"),
            "connect_client.gd"
        );
    }
}
