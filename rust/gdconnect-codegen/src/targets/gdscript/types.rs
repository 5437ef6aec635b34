//! GDScript type mapping and default literals.

use gdconnect_schema::{Field, FieldKind};

/// The GDScript types generated parameters can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GdType {
    String,
    Int,
    Float,
    Bool,
    Dictionary,
    Array,
    Variant,
}

impl GdType {
    /// The type name as written in generated signatures.
    pub fn name(self) -> &'static str {
        match self {
            GdType::String => "String",
            GdType::Int => "int",
            GdType::Float => "float",
            GdType::Bool => "bool",
            GdType::Dictionary => "Dictionary",
            GdType::Array => "Array",
            GdType::Variant => "Variant",
        }
    }

    /// The default literal paired with the type, used both for optional
    /// parameter defaults and for the omit-if-default guard.
    pub fn default_literal(self) -> &'static str {
        match self {
            GdType::String => "\"\"",
            GdType::Int => "0",
            GdType::Float => "0.0",
            GdType::Bool => "false",
            GdType::Dictionary => "{}",
            GdType::Array => "[]",
            GdType::Variant => "null",
        }
    }
}

/// Map a schema kind to its GDScript type. Total: unrecognized kinds
/// degrade to `Variant` instead of failing generation.
pub fn map_kind(kind: &FieldKind) -> GdType {
    match kind {
        FieldKind::Text => GdType::String,
        FieldKind::Int32 | FieldKind::Int64 | FieldKind::Uint32 | FieldKind::Uint64 => GdType::Int,
        FieldKind::Float | FieldKind::Double => GdType::Float,
        FieldKind::Bool => GdType::Bool,
        FieldKind::Message => GdType::Dictionary,
        FieldKind::Other(_) => GdType::Variant,
    }
}

/// The type a field takes in a generated signature: repeated fields are
/// carried as `Array`, everything else maps by kind.
pub fn field_type(field: &Field) -> GdType {
    if field.repeated {
        GdType::Array
    } else {
        map_kind(&field.kind)
    }
}
