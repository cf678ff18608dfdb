//! Static field-name → transform rule table.
//!
//! The table is total: every field name resolves to a rule, and names that
//! are not listed resolve to [`FieldTransformRule::Passthrough`].

/// How a decoded JSON value is rebuilt, selected by its field name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldTransformRule {
    /// String → UUID.
    Identifier,
    /// Collection of point maps → list of points; a single point is wrapped.
    Points,
    /// Flat map → selection rectangle.
    Rect,
    /// Flat map → affine matrix.
    Matrix,
    /// Map of already decoded fields → shape.
    Shape,
    /// Collection of strings → list of UUIDs.
    UuidCollection,
    /// Collection of strings → set of keywords; anything else → nil.
    KeywordSet,
    /// String → keyword.
    SymbolicEnum,
    /// Sequence of `{attr, val}` records, each `val` rebuilt by its `attr`.
    Operations,
    /// Left unchanged.
    Passthrough,
}

/// `type` values that stay plain strings (text content node types).
pub const RESERVED_TYPE_LITERALS: [&str; 3] = ["root", "paragraph-set", "paragraph"];

/// Look up the rule for a kebab-cased field name.
pub fn rule_for(field: &str) -> FieldTransformRule {
    use FieldTransformRule::*;

    match field {
        "id"
        | "page-id"
        | "file-id"
        | "frame-id"
        | "parent-id"
        | "team-id"
        | "project-id"
        | "profile-id"
        | "component-id"
        | "component-file"
        | "shape-ref"
        | "session-id"
        | "main-instance-id"
        | "typography-ref-id"
        | "typography-ref-file"
        | "fill-color-ref-id"
        | "fill-color-ref-file"
        | "stroke-color-ref-id"
        | "stroke-color-ref-file" => Identifier,

        "points" => Points,
        "selrect" => Rect,
        "transform" | "transform-inverse" => Matrix,
        "obj" => Shape,
        "shapes" => UuidCollection,
        "touched" => KeywordSet,
        "operations" => Operations,

        "type"
        | "constraints-h"
        | "constraints-v"
        | "blend-mode"
        | "layout"
        | "layout-flex-dir"
        | "layout-wrap-type"
        | "layout-padding-type"
        | "layout-gap-type"
        | "layout-align-items"
        | "layout-align-content"
        | "layout-justify-items"
        | "layout-justify-content"
        | "layout-item-h-sizing"
        | "layout-item-v-sizing"
        | "layout-item-align-self"
        | "bool-type"
        | "command"
        | "grow-type"
        | "stroke-alignment"
        | "stroke-style"
        | "stroke-cap-start"
        | "stroke-cap-end"
        | "fill-rule" => SymbolicEnum,

        _ => Passthrough,
    }
}
