//! Structured view of C type spellings and the equivalence used when comparing
//! call-site arguments against registered message signatures.

mod compat;
mod normalize;

pub use compat::{DEFAULT_INT_BACKED_ENUMS, SuppliedArgument, TypeRules};
pub use normalize::{Normalizer, normalize};

use std::fmt;

/// Surface layout of a type spelling.
///
/// A leading `const` is kept as the outermost layer so that `const char *`
/// reads as `Const(Pointer(char))`; the comparison rules peel and re-apply that
/// prefix textually rather than tracking C's declarator precedence.
/// A `const` written after the last `*` qualifies the pointer itself and is
/// kept apart as [`CType::ConstPointer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CType {
    Named(String),
    Const(Box<CType>),
    Pointer(Box<CType>),
    /// `T * const`; wraps the [`CType::Pointer`].
    ConstPointer(Box<CType>),
    Array {
        element: Box<CType>,
        length: Option<u64>,
    },
}

impl CType {
    /// Parse a spelling as rendered by the host compiler. Never fails; anything
    /// without a recognised suffix or prefix becomes [`CType::Named`].
    #[must_use]
    pub fn parse(spelling: &str) -> Self {
        let trimmed = spelling.trim();
        if let Some(rest) = trimmed.strip_prefix("const ") {
            return CType::Const(Box::new(CType::parse(rest)));
        }
        if let Some(rest) = trimmed.strip_suffix('*') {
            return CType::Pointer(Box::new(CType::parse(rest)));
        }
        if let Some(rest) = strip_trailing_const(trimmed) {
            let inner = Box::new(CType::parse(rest));
            return if rest.ends_with('*') {
                CType::ConstPointer(inner)
            } else {
                CType::Const(inner)
            };
        }
        if let Some(body) = trimmed.strip_suffix(']')
            && let Some(open) = body.rfind('[')
        {
            let length = body[open + 1..].trim().parse::<u64>().ok();
            return CType::Array {
                element: Box::new(CType::parse(&body[..open])),
                length,
            };
        }
        CType::Named(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    #[must_use]
    pub fn named(name: &str) -> Self {
        CType::Named(name.to_string())
    }

    /// The type with any leading `const` and top-level pointer qualifiers
    /// removed.
    #[must_use]
    pub fn unqualified(&self) -> &CType {
        match self {
            CType::Const(inner) | CType::ConstPointer(inner) => inner.unqualified(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_const(&self) -> bool {
        matches!(self, CType::Const(_))
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self.unqualified(), CType::Pointer(_))
    }

    /// Pointee of a (possibly const) pointer.
    #[must_use]
    pub fn pointee(&self) -> Option<&CType> {
        match self.unqualified() {
            CType::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Pointer (possibly const) to `void` of any qualification.
    #[must_use]
    pub fn is_void_pointer(&self) -> bool {
        self.pointee()
            .is_some_and(|pointee| pointee.unqualified().is_named("void"))
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, CType::Named(n) if n == name)
    }
}

/// The spelling before a trailing `const` that follows a word or a `*`.
fn strip_trailing_const(spelling: &str) -> Option<&str> {
    let rest = spelling.strip_suffix("const")?;
    if rest.ends_with(|c: char| c == '*' || c.is_whitespace()) {
        Some(rest.trim_end())
    } else {
        None
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Named(name) => f.write_str(name),
            CType::Const(inner) => write!(f, "const {inner}"),
            CType::Pointer(inner) if matches!(**inner, CType::Pointer(_)) => write!(f, "{inner}*"),
            CType::Pointer(inner) => write!(f, "{inner} *"),
            CType::ConstPointer(inner) => write!(f, "{inner} const"),
            CType::Array {
                element,
                length: Some(length),
            } => write!(f, "{element}[{length}]"),
            CType::Array {
                element,
                length: None,
            } => write!(f, "{element}[]"),
        }
    }
}

/// Comparable description of a declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub raw_spelling: String,
    pub is_pointer: bool,
    pub is_const_qualified: bool,
    /// Only meaningful when `is_pointer` is set.
    pub pointee_is_void: bool,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(spelling: impl Into<String>) -> Self {
        let raw_spelling = spelling.into();
        let resolved =
            normalize::default_normalizer().normalize_type(&CType::parse(&raw_spelling));
        Self {
            is_pointer: resolved.is_pointer(),
            is_const_qualified: resolved.is_const(),
            pointee_is_void: resolved.is_void_pointer(),
            raw_spelling,
        }
    }

    /// Canonical comparison key under the default alias tables.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        normalize(&self.raw_spelling)
    }
}

impl PartialEq<str> for TypeDescriptor {
    fn eq(&self, other: &str) -> bool {
        self.canonical_key() == normalize(other)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_peels_leading_const_first() {
        let parsed = CType::parse("const char *");
        assert_eq!(
            parsed,
            CType::Const(Box::new(CType::Pointer(Box::new(CType::named("char")))))
        );
        assert_eq!(parsed.to_string(), "const char *");
    }

    #[test]
    fn parse_handles_arrays_and_pointer_to_array() {
        assert_eq!(
            CType::parse("char[6]"),
            CType::Array {
                element: Box::new(CType::named("char")),
                length: Some(6),
            }
        );
        let option_table = CType::parse("struct pcmk__cluster_option_t[10] *");
        assert_eq!(
            option_table.to_string(),
            "struct pcmk__cluster_option_t[10] *"
        );
        assert!(option_table.is_pointer());
    }

    #[test]
    fn parse_collapses_whitespace_and_renders_double_pointers() {
        assert_eq!(
            CType::parse("  unsigned   long  ").to_string(),
            "unsigned long"
        );
        assert_eq!(CType::parse("char **").to_string(), "char **");
    }

    #[test]
    fn descriptor_flags_follow_spelling() {
        let void_ptr = TypeDescriptor::new("void *");
        assert!(void_ptr.is_pointer && void_ptr.pointee_is_void);
        assert!(!void_ptr.is_const_qualified);

        let const_void = TypeDescriptor::new("const void *");
        assert!(const_void.is_pointer && const_void.pointee_is_void);
        assert!(const_void.is_const_qualified);

        let node = TypeDescriptor::new("pcmk_node_t *");
        assert!(node.is_pointer && !node.pointee_is_void);

        let int = TypeDescriptor::new("int");
        assert!(!int.is_pointer && !int.pointee_is_void);
    }

    #[test]
    fn descriptor_flags_see_through_void_pointer_typedefs() {
        let generic = TypeDescriptor::new("gpointer");
        assert!(generic.is_pointer && generic.pointee_is_void);
        assert!(!generic.is_const_qualified);

        let read_only = TypeDescriptor::new("gconstpointer");
        assert!(read_only.is_pointer && read_only.pointee_is_void);
        assert!(read_only.is_const_qualified);
    }

    #[test]
    fn trailing_const_qualifies_the_pointer_itself() {
        assert_eq!(
            CType::parse("char * const"),
            CType::ConstPointer(Box::new(CType::Pointer(Box::new(CType::named("char")))))
        );
        assert_eq!(CType::parse("char *const").to_string(), "char * const");
        assert_eq!(
            CType::parse("const char * const").to_string(),
            "const char * const"
        );
        assert!(CType::parse("char * const").is_pointer());
        assert_eq!(
            CType::parse("char const *"),
            CType::Pointer(Box::new(CType::Const(Box::new(CType::named("char")))))
        );
        assert_eq!(CType::parse("char const *").to_string(), "const char *");
    }

    #[test]
    fn aliased_descriptors_compare_equal() {
        let verbose = TypeDescriptor::new("long long unsigned int");
        assert_eq!(verbose.canonical_key(), "unsigned long long int");
        assert!(verbose == *"unsigned long long");
        assert!(TypeDescriptor::new("GList *") == *"struct GList *");
    }
}
