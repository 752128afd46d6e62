use std::sync::OnceLock;

use super::CType;

/// Integer spellings the host renders inconsistently.
const BASIC_ALIASES: &[(&str, &str)] = &[
    ("long long unsigned int", "unsigned long long int"),
    ("unsigned long long", "unsigned long long int"),
    ("long unsigned int", "unsigned long int"),
    ("unsigned long", "unsigned long int"),
    ("short unsigned int", "unsigned short int"),
    ("unsigned short", "unsigned short int"),
    ("unsigned", "unsigned int"),
    ("long long", "long long int"),
    ("long", "long int"),
    ("short", "short int"),
    ("signed", "int"),
    ("signed int", "int"),
    ("_Bool", "bool"),
    ("time_t", "long int"),
    ("size_t", "unsigned long int"),
];

/// GLib and libxml2 handle typedefs.
const LIBRARY_ALIASES: &[(&str, &str)] = &[
    ("GList *", "struct GList *"),
    ("GSList *", "struct GSList *"),
    ("GHashTable *", "struct GHashTable *"),
    ("GString *", "struct GString *"),
    ("xmlNodePtr", "struct xmlNode *"),
    ("xmlNode *", "struct xmlNode *"),
    ("xmlDocPtr", "struct xmlDoc *"),
    ("xmlDoc *", "struct xmlDoc *"),
    ("xmlChar", "unsigned char"),
    ("xmlChar *", "unsigned char *"),
    ("gboolean", "int"),
    ("gint", "int"),
    ("guint", "unsigned int"),
    ("gchar", "char"),
    ("gsize", "unsigned long int"),
    ("gpointer", "void *"),
    ("gconstpointer", "const void *"),
];

/// Opaque handles and enum typedefs of the checked codebase.
const DOMAIN_ALIASES: &[(&str, &str)] = &[
    ("pcmk_node_t *", "struct pcmk_node_t *"),
    ("pcmk_resource_t *", "struct pcmk_resource_t *"),
    ("pcmk_action_t *", "struct pcmk_action_t *"),
    ("pcmk_scheduler_t *", "struct pcmk_scheduler_t *"),
    ("pcmk__location_t *", "struct pcmk__location_t *"),
    ("pcmk__op_digest_t *", "struct pcmk__op_digest_t *"),
    ("pcmk__ticket_t *", "struct pcmk__ticket_t *"),
    ("pcmk__cluster_option_t *", "struct pcmk__cluster_option_t *"),
    ("attr_update_data_t *", "struct attr_update_data_t *"),
    ("crm_time_t *", "struct crm_time_t *"),
    ("crm_time_period_t *", "struct crm_time_period_t *"),
    ("lrmd_list_t *", "struct lrmd_list_t *"),
    ("resource_checks_t *", "struct resource_checks_t *"),
    ("stonith_history_t *", "struct stonith_history_t *"),
    ("pe_node_t *", "struct pe_node_t *"),
    ("pe_resource_t *", "struct pe_resource_t *"),
    ("pe_working_set_t *", "struct pe_working_set_t *"),
    ("crm_exit_e", "crm_exit_t"),
    ("pcmk__fence_history", "enum pcmk__fence_history"),
    ("pcmk_pacemakerd_state", "enum pcmk_pacemakerd_state"),
];

type AliasTable = Vec<(CType, CType)>;

fn parse_table(entries: &[(&str, &str)]) -> AliasTable {
    entries
        .iter()
        .map(|(from, to)| (CType::parse(from), CType::parse(to)))
        .collect()
}

fn builtin_tables() -> &'static [AliasTable; 3] {
    static TABLES: OnceLock<[AliasTable; 3]> = OnceLock::new();
    TABLES.get_or_init(|| {
        [
            parse_table(BASIC_ALIASES),
            parse_table(LIBRARY_ALIASES),
            parse_table(DOMAIN_ALIASES),
        ]
    })
}

/// Maps type spellings to canonical comparison keys.
///
/// The built-in tables are always consulted; `extra` domain aliases come from
/// configuration and are looked up after them.
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    extra: AliasTable,
}

impl Normalizer {
    #[must_use]
    pub fn with_aliases<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let extra = aliases
            .into_iter()
            .map(|(from, to)| (CType::parse(from.as_ref()), CType::parse(to.as_ref())))
            .collect();
        Self { extra }
    }

    #[must_use]
    pub fn normalize(&self, spelling: &str) -> String {
        self.normalize_type(&CType::parse(spelling)).to_string()
    }

    #[must_use]
    pub fn normalize_type(&self, ty: &CType) -> CType {
        if let CType::Array { element, .. } = ty
            && element.unqualified().is_named("char")
        {
            return CType::Pointer(element.clone());
        }
        let tables = builtin_tables();
        let aliased = tables
            .iter()
            .chain(std::iter::once(&self.extra))
            .flat_map(|table| table.iter())
            .find(|(from, _)| from == ty);
        if let Some((_, to)) = aliased {
            return to.clone();
        }
        match ty {
            CType::Const(inner) => CType::Const(Box::new(self.normalize_type(inner))),
            // Top-level pointer qualifiers do not apply to by-value arguments.
            CType::ConstPointer(inner) => self.normalize_type(inner),
            other => other.clone(),
        }
    }
}

pub(super) fn default_normalizer() -> &'static Normalizer {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default)
}

/// Canonical key for `spelling` under the built-in alias tables.
#[must_use]
pub fn normalize(spelling: &str) -> String {
    default_normalizer().normalize(spelling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_arrays_decay_preserving_const() {
        assert_eq!(normalize("char[6]"), "char *");
        assert_eq!(normalize("const char[12]"), "const char *");
        assert_eq!(normalize("int[4]"), "int[4]");
    }

    #[test]
    fn basic_aliases_canonicalise_integer_spellings() {
        assert_eq!(normalize("long long unsigned int"), "unsigned long long int");
        assert_eq!(normalize("long"), "long int");
        assert_eq!(normalize("_Bool"), "bool");
        assert_eq!(normalize("time_t"), "long int");
        assert_eq!(normalize("unsigned"), "unsigned int");
    }

    #[test]
    fn library_and_domain_aliases_use_struct_form() {
        assert_eq!(normalize("GHashTable *"), "struct GHashTable *");
        assert_eq!(normalize("xmlNodePtr"), "struct xmlNode *");
        assert_eq!(normalize("guint"), "unsigned int");
        assert_eq!(normalize("pcmk_node_t *"), "struct pcmk_node_t *");
        assert_eq!(normalize("pcmk__fence_history"), "enum pcmk__fence_history");
    }

    #[test]
    fn glib_generic_pointers_resolve_to_void_pointers() {
        assert_eq!(normalize("gpointer"), "void *");
        assert_eq!(normalize("gconstpointer"), "const void *");
    }

    #[test]
    fn pointer_qualifiers_are_dropped() {
        assert_eq!(normalize("char * const"), "char *");
        assert_eq!(normalize("const char * const"), "const char *");
        assert_eq!(normalize("char const *"), "const char *");
        assert_eq!(normalize("pcmk_node_t *const"), "struct pcmk_node_t *");
    }

    #[test]
    fn const_is_reapplied_after_normalising_inner_type() {
        assert_eq!(normalize("const pcmk_node_t *"), "const struct pcmk_node_t *");
        assert_eq!(normalize("const long"), "const long int");
    }

    #[test]
    fn unknown_spellings_pass_through() {
        assert_eq!(normalize("struct foo_s *"), "struct foo_s *");
        assert_eq!(normalize("  unsigned   char "), "unsigned char");
    }

    #[test]
    fn configured_aliases_extend_domain_table() {
        let normalizer =
            Normalizer::with_aliases([("pcmk__graph_t *", "struct pcmk__graph_t *")]);
        assert_eq!(
            normalizer.normalize("pcmk__graph_t *"),
            "struct pcmk__graph_t *"
        );
        assert_eq!(normalize("pcmk__graph_t *"), "pcmk__graph_t *");
    }
}
