use std::fmt;

/// A parsed Smithy shape ID: `namespace#name` or `namespace#name$member`.
///
/// The namespace is optional here because shape references inside a file
/// are frequently relative (just `name` or `name$member`); resolving a
/// relative ID against the declaring file's namespace and `use` imports is
/// a semantic concern that lives above this crate (see `SmithyFile`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeId {
    pub namespace: Option<String>,
    pub name: String,
    pub member: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeIdError {
    #[error("shape ID is empty")]
    Empty,
    #[error("shape ID has an empty namespace, name, or member component: {0}")]
    EmptyComponent(String),
    #[error("shape ID has more than one '#': {0}")]
    MultipleNamespaceSeparators(String),
    #[error("shape ID has more than one '$': {0}")]
    MultipleMemberSeparators(String),
}

impl ShapeId {
    pub fn parse(text: &str) -> Result<Self, ShapeIdError> {
        if text.is_empty() {
            return Err(ShapeIdError::Empty);
        }

        let (before_member, member) = match text.split_once('$') {
            Some((before, after)) => {
                if after.contains('$') {
                    return Err(ShapeIdError::MultipleMemberSeparators(text.to_string()));
                }
                if after.is_empty() {
                    return Err(ShapeIdError::EmptyComponent(text.to_string()));
                }
                (before, Some(after.to_string()))
            }
            None => (text, None),
        };

        let (namespace, name) = match before_member.split_once('#') {
            Some((ns, name)) => {
                if name.contains('#') {
                    return Err(ShapeIdError::MultipleNamespaceSeparators(text.to_string()));
                }
                if ns.is_empty() || name.is_empty() {
                    return Err(ShapeIdError::EmptyComponent(text.to_string()));
                }
                (Some(ns.to_string()), name.to_string())
            }
            None => {
                if before_member.is_empty() {
                    return Err(ShapeIdError::EmptyComponent(text.to_string()));
                }
                (None, before_member.to_string())
            }
        };

        Ok(ShapeId {
            namespace,
            name,
            member,
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.namespace.is_some()
    }

    /// Resolves a relative shape ID against a namespace, producing an
    /// absolute ID. No-op if already absolute.
    pub fn resolve(&self, namespace: &str) -> ShapeId {
        if self.namespace.is_some() {
            self.clone()
        } else {
            ShapeId {
                namespace: Some(namespace.to_string()),
                name: self.name.clone(),
                member: self.member.clone(),
            }
        }
    }

    /// Drops the member component, yielding the shape ID of the containing shape.
    pub fn shape_only(&self) -> ShapeId {
        ShapeId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: None,
        }
    }

    pub fn with_member(&self, member: impl Into<String>) -> ShapeId {
        ShapeId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// Combines a relative reference with the absolute shape an import
    /// brought into scope under the same bare name, carrying over the
    /// reference's own member component (if any) since `use` imports name
    /// a shape, never a member.
    pub fn combine_import(&self, imported_base: &ShapeId) -> ShapeId {
        match &self.member {
            Some(m) => imported_base.with_member(m.clone()),
            None => imported_base.clone(),
        }
    }
}

/// Resolves a possibly-relative shape-id reference against a file's
/// namespace and its `use` imports (bare name -> absolute shape ID).
/// Absolute references pass through unchanged; names matching an import
/// resolve to that import's namespace; anything else resolves against
/// `namespace`.
pub fn resolve_relative(
    text: &str,
    namespace: &str,
    imports: &std::collections::HashMap<String, ShapeId>,
) -> Result<ShapeId, ShapeIdError> {
    let parsed = ShapeId::parse(text)?;
    if parsed.is_absolute() {
        return Ok(parsed);
    }
    if let Some(imported) = imports.get(&parsed.name) {
        return Ok(parsed.combine_import(imported));
    }
    Ok(parsed.resolve(namespace))
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}#{}", self.name)?;
        } else {
            write!(f, "{}", self.name)?;
        }
        if let Some(member) = &self.member {
            write!(f, "${member}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_shape_id() {
        let id = ShapeId::parse("com.foo#Bar").expect("parse");
        assert_eq!(id.namespace.as_deref(), Some("com.foo"));
        assert_eq!(id.name, "Bar");
        assert_eq!(id.member, None);
    }

    #[test]
    fn parses_shape_id_with_member() {
        let id = ShapeId::parse("com.foo#Bar$baz").expect("parse");
        assert_eq!(id.namespace.as_deref(), Some("com.foo"));
        assert_eq!(id.name, "Bar");
        assert_eq!(id.member.as_deref(), Some("baz"));
    }

    #[test]
    fn parses_relative_shape_id() {
        let id = ShapeId::parse("Bar$baz").expect("parse");
        assert!(!id.is_absolute());
        assert_eq!(id.name, "Bar");
        assert_eq!(id.member.as_deref(), Some("baz"));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(ShapeId::parse(""), Err(ShapeIdError::Empty));
        assert!(ShapeId::parse("com.foo#").is_err());
        assert!(ShapeId::parse("#Bar").is_err());
        assert!(ShapeId::parse("Bar$").is_err());
        assert!(ShapeId::parse("a#b#c").is_err());
        assert!(ShapeId::parse("a$b$c").is_err());
    }

    #[test]
    fn resolve_against_namespace() {
        let relative = ShapeId::parse("Bar").expect("parse");
        let resolved = relative.resolve("com.foo");
        assert_eq!(resolved.to_string(), "com.foo#Bar");

        let absolute = ShapeId::parse("com.other#Bar").expect("parse");
        assert_eq!(absolute.resolve("com.foo").to_string(), "com.other#Bar");
    }

    #[test]
    fn display_roundtrips() {
        for text in ["com.foo#Bar", "com.foo#Bar$baz", "Bar", "Bar$baz"] {
            let id = ShapeId::parse(text).expect("parse");
            assert_eq!(id.to_string(), text);
        }
    }

    #[test]
    fn shape_only_drops_member() {
        let id = ShapeId::parse("com.foo#Bar$baz").expect("parse");
        assert_eq!(id.shape_only().to_string(), "com.foo#Bar");
    }

    #[test]
    fn resolve_relative_prefers_import_over_namespace() {
        let mut imports = std::collections::HashMap::new();
        imports.insert("Baz".to_string(), ShapeId::parse("com.bar#Baz").unwrap());

        let resolved = resolve_relative("Baz", "com.foo", &imports).unwrap();
        assert_eq!(resolved.to_string(), "com.bar#Baz");

        let resolved_member = resolve_relative("Baz$m", "com.foo", &imports).unwrap();
        assert_eq!(resolved_member.to_string(), "com.bar#Baz$m");

        let unimported = resolve_relative("Other", "com.foo", &imports).unwrap();
        assert_eq!(unimported.to_string(), "com.foo#Other");

        let already_absolute = resolve_relative("com.other#X", "com.foo", &imports).unwrap();
        assert_eq!(already_absolute.to_string(), "com.other#X");
    }
}
