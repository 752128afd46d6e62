use std::sync::OnceLock;

use regex::Regex;

use super::{CType, Normalizer, TypeDescriptor};

const INTEGER_WORDS: &[&str] = &["signed", "unsigned", "short", "long", "int"];

/// Enums the host lowers to plain `int` at the late stage.
pub const DEFAULT_INT_BACKED_ENUMS: &[&str] = &["enum shadow_disp_flags", "enum pcmk__fence_history"];

fn fixed_width_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^u?int(8|16|32|64|ptr|max)_t$").ok())
        .as_ref()
}

fn is_integer_name(name: &str) -> bool {
    if matches!(name, "size_t" | "ssize_t") {
        return true;
    }
    if fixed_width_pattern().is_some_and(|pattern| pattern.is_match(name)) {
        return true;
    }
    name.split(' ').all(|word| INTEGER_WORDS.contains(&word))
}

fn is_integer_ctype(ty: &CType) -> bool {
    match ty.unqualified() {
        CType::Named(name) => is_integer_name(name),
        _ => false,
    }
}

/// One argument observed at a call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuppliedArgument {
    pub ty: TypeDescriptor,
    /// Value of an integer constant written directly at the call site.
    pub literal: Option<i128>,
}

impl SuppliedArgument {
    #[must_use]
    pub fn new(spelling: impl Into<String>) -> Self {
        Self {
            ty: TypeDescriptor::new(spelling),
            literal: None,
        }
    }

    #[must_use]
    pub fn integer_literal(spelling: impl Into<String>, value: i128) -> Self {
        Self {
            ty: TypeDescriptor::new(spelling),
            literal: Some(value),
        }
    }

    #[must_use]
    pub fn is_integer_literal(&self) -> bool {
        self.literal.is_some()
    }

    #[must_use]
    pub fn is_integer_literal_zero(&self) -> bool {
        self.literal == Some(0)
    }
}

/// Type equivalence plus the escape rules applied to message arguments.
#[derive(Clone, Debug)]
pub struct TypeRules {
    normalizer: Normalizer,
    int_backed_enums: Vec<String>,
}

impl Default for TypeRules {
    fn default() -> Self {
        Self::new(Normalizer::default(), DEFAULT_INT_BACKED_ENUMS.iter().copied())
    }
}

impl TypeRules {
    #[must_use]
    pub fn new<I, S>(normalizer: Normalizer, int_backed_enums: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let int_backed_enums = int_backed_enums
            .into_iter()
            .map(|name| normalizer.normalize(name.as_ref()))
            .collect();
        Self {
            normalizer,
            int_backed_enums,
        }
    }

    /// Alias-aware equality. An unqualified argument satisfies a const-qualified
    /// expectation; the reverse never holds.
    #[must_use]
    pub fn types_match(&self, expected: &str, given: &str) -> bool {
        let expected = self.normalizer.normalize(expected);
        let given = self.normalizer.normalize(given);
        keys_match(&expected, &given)
    }

    /// Whether `argument` may be passed where `expected` was registered.
    #[must_use]
    pub fn argument_satisfies(&self, expected: &str, argument: &SuppliedArgument) -> bool {
        if self.types_match(expected, &argument.ty.raw_spelling) {
            return true;
        }
        let expected_ty = self.normalizer.normalize_type(&CType::parse(expected));
        if argument.is_integer_literal() && is_integer_ctype(&expected_ty) {
            return true;
        }
        let given_ty = self
            .normalizer
            .normalize_type(&CType::parse(&argument.ty.raw_spelling));
        if expected_ty.is_pointer()
            && (argument.is_integer_literal_zero() || given_ty.is_void_pointer())
        {
            return true;
        }
        self.supplementary_match(&expected_ty, &given_ty)
    }

    fn supplementary_match(&self, expected: &CType, given_ty: &CType) -> bool {
        let expected_key = expected.to_string();
        if given_ty.is_named("int")
            && (expected_key == "bool" || self.int_backed_enums.contains(&expected_key))
        {
            return true;
        }
        if let CType::Pointer(pointee) = given_ty
            && let CType::Array { element, .. } = pointee.as_ref()
        {
            let decayed = self
                .normalizer
                .normalize_type(&CType::Pointer(element.clone()));
            return keys_match(&expected_key, &decayed.to_string());
        }
        false
    }
}

fn keys_match(expected: &str, given: &str) -> bool {
    expected == given
        || expected
            .strip_prefix("const ")
            .is_some_and(|unqualified| unqualified == given)
}
