//! Decode-side error taxonomy.

use crate::factory::tag::{CategoryTag, ItemTypeTag};
use serde_path_to_error::Segment;
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors surfaced while turning a document into a typed value.
///
/// Every variant except `Syntax` aborts the enclosing decode. Reserved tags
/// inside a sequence are not errors; they are logged and omitted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("missing discriminator `{field}` at `{}`", display_path(.path))]
    MissingDiscriminator { field: &'static str, path: String },

    #[error("unsupported category: {0}")]
    UnsupportedCategory(CategoryTag),

    #[error("unknown {category} type `{tag}` at `{}`", display_path(.path))]
    UnknownItemType {
        category: &'static str,
        tag: ItemTypeTag,
        path: String,
    },

    #[error("{category} type `{tag}` is reserved and cannot be decoded on its own")]
    ReservedType {
        category: &'static str,
        tag: ItemTypeTag,
    },

    #[error("invalid field at `{}`: {source}", display_path(.path))]
    Field {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn field(source: serde_json::Error) -> Self {
        Self::Field {
            path: String::new(),
            source,
        }
    }

    /// Structural error carrying the field path reported by the deserializer.
    pub fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let mut path = String::new();
        for segment in err.path().iter() {
            let rendered = match segment {
                Segment::Seq { index } => format!("[{index}]"),
                Segment::Map { key } => key.clone(),
                other => other.to_string(),
            };
            path = if rendered.starts_with('[') {
                format!("{path}{rendered}")
            } else if path.is_empty() {
                rendered
            } else {
                format!("{path}.{rendered}")
            };
        }
        Self::Field {
            path,
            source: err.into_inner(),
        }
    }

    /// Prefixes the error location with one enclosing path segment.
    ///
    /// Segments are either `name` or `name[index]`; callers apply them from
    /// the innermost container outwards.
    pub fn at(mut self, segment: impl AsRef<str>) -> Self {
        match &mut self {
            Self::MissingDiscriminator { path, .. }
            | Self::UnknownItemType { path, .. }
            | Self::Field { path, .. } => {
                *path = join_path(segment.as_ref(), path);
            }
            Self::Syntax(_) | Self::UnsupportedCategory(_) | Self::ReservedType { .. } => {}
        }
        self
    }

    /// Document path the error refers to, empty for the document root.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingDiscriminator { path, .. }
            | Self::UnknownItemType { path, .. }
            | Self::Field { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.is_empty() {
        segment.to_string()
    } else if rest.starts_with('[') {
        format!("{segment}{rest}")
    } else {
        format!("{segment}.{rest}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::DecodeError;
    use crate::factory::tag::ItemTypeTag;

    #[test]
    fn at_builds_dotted_path_from_inside_out() {
        let err = DecodeError::UnknownItemType {
            category: "profileTableItem",
            tag: ItemTypeTag::from("mystery"),
            path: String::new(),
        }
        .at("items[2]")
        .at("sections[0]");

        assert_eq!(err.path(), Some("sections[0].items[2]"));
        assert!(err.to_string().contains("`mystery`"));
        assert!(err.to_string().contains("sections[0].items[2]"));
    }

    #[test]
    fn path_error_fields_nest_under_enclosing_segments() {
        let document = serde_json::json!({ "steps": [{ "delay": "soon" }] });
        #[derive(Debug, serde::Deserialize)]
        struct Step {
            #[allow(dead_code)]
            delay: u32,
        }
        #[derive(Debug, serde::Deserialize)]
        struct Task {
            #[allow(dead_code)]
            steps: Vec<Step>,
        }

        let err = serde_path_to_error::deserialize::<_, Task>(&document)
            .map_err(DecodeError::from_path_error)
            .expect_err("string delay must fail")
            .at("tasks[3]");
        assert_eq!(err.path(), Some("tasks[3].steps[0].delay"));
    }

    #[test]
    fn root_errors_render_root_marker() {
        let err = DecodeError::MissingDiscriminator {
            field: "type",
            path: String::new(),
        };
        assert_eq!(err.to_string(), "missing discriminator `type` at `<root>`");
    }
}
