//! Call-site validator for `out->message(out, "name", ...)` dispatch.
//!
//! Each function captured at the configured late stage is scanned for calls
//! through the context record's dispatch slot. For every such call the message
//! name is resolved from the second argument and the remaining arguments are
//! checked against the registered signature.

pub mod config;

pub use config::{CheckConfig, CheckConfigLayer};

use std::fmt;

use crate::diagnostics::{DiagnosticDescriptor, DiagnosticSink, Location, codes};
use crate::ir::{ArgumentValue, ArgumentView, CallExpr, CalleeShape, FunctionView};
use crate::registry::SignatureRegistry;
use crate::types::{SuppliedArgument, TypeRules};

pub const UNRESOLVED_NAME_NOTE: &str = "Cannot figure out message name";

/// How the message name of a call site was determined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameResolution {
    Literal(String),
    /// The name comes from an element-name helper and may be any of these.
    CandidateSet(Vec<String>),
    Unresolvable,
}

/// A dispatch call selected for checking. `arguments` includes the two fixed
/// leading arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub location: Location,
    pub resolution: NameResolution,
    pub arguments: Vec<SuppliedArgument>,
}

impl CallSite {
    /// Number of message-specific arguments.
    #[must_use]
    pub fn message_argument_count(&self) -> usize {
        self.arguments.len().saturating_sub(2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallSiteError {
    UnknownMessage {
        message: String,
    },
    NotRegistered {
        message: String,
    },
    ArgumentCount {
        message: String,
        expected: usize,
        got: usize,
    },
    /// `position` is 1-based and excludes the two fixed arguments.
    ArgumentType {
        expected: String,
        given: String,
        position: usize,
    },
}

impl CallSiteError {
    #[must_use]
    pub fn descriptor(&self) -> &'static DiagnosticDescriptor {
        match self {
            CallSiteError::UnknownMessage { .. } => &codes::UNKNOWN_MESSAGE,
            CallSiteError::NotRegistered { .. } => &codes::UNREGISTERED_CANDIDATE,
            CallSiteError::ArgumentCount { .. } => &codes::ARGUMENT_COUNT,
            CallSiteError::ArgumentType { .. } => &codes::ARGUMENT_TYPE,
        }
    }
}

impl fmt::Display for CallSiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallSiteError::UnknownMessage { message } => {
                write!(f, "Unknown format message: {message}")
            }
            CallSiteError::NotRegistered { message } => {
                write!(f, "Message not registered: {message}")
            }
            CallSiteError::ArgumentCount {
                message,
                expected,
                got,
            } => write!(
                f,
                "Expected {expected} arguments to message {message}, but got {got}"
            ),
            CallSiteError::ArgumentType {
                expected,
                given,
                position,
            } => write!(
                f,
                "Expected '{expected}', but got '{given}' in argument {position}"
            ),
        }
    }
}

/// Final judgement for one call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error(CallSiteError),
    /// The name could not be resolved; reported as a note only.
    Note,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteReport {
    pub location: Location,
    pub resolution: NameResolution,
    pub outcome: Outcome,
}

/// Every matched call site of one function and its outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionReport {
    pub function: String,
    pub sites: Vec<SiteReport>,
}

impl FunctionReport {
    #[must_use]
    pub fn errors(&self) -> usize {
        self.sites
            .iter()
            .filter(|site| matches!(site.outcome, Outcome::Error(_)))
            .count()
    }

    #[must_use]
    pub fn notes(&self) -> usize {
        self.sites
            .iter()
            .filter(|site| site.outcome == Outcome::Note)
            .count()
    }
}

pub struct Validator<'a> {
    registry: &'a SignatureRegistry,
    config: &'a CheckConfig,
    rules: TypeRules,
}

impl<'a> Validator<'a> {
    #[must_use]
    pub fn new(registry: &'a SignatureRegistry, config: &'a CheckConfig) -> Self {
        Self {
            registry,
            config,
            rules: config.type_rules(),
        }
    }

    /// Entry point for the host's per-function callback. Functions reported
    /// at any stage other than the configured one are ignored.
    pub fn run_pass(
        &self,
        pass: &str,
        function: &dyn FunctionView,
        sink: &mut DiagnosticSink,
    ) -> Option<FunctionReport> {
        if pass != self.config.analysis_stage {
            tracing::trace!(
                target: "check",
                function = function.name(),
                pass,
                "skipping function outside analysis stage"
            );
            return None;
        }
        Some(self.check_function(function, sink))
    }

    pub fn check_function(
        &self,
        function: &dyn FunctionView,
        sink: &mut DiagnosticSink,
    ) -> FunctionReport {
        let mut report = FunctionReport {
            function: function.name().to_string(),
            sites: Vec::new(),
        };
        for call in function.call_expressions() {
            let Some(site) = self.match_call(&call) else {
                continue;
            };
            let outcome = self.check_call_site(&site);
            match &outcome {
                Outcome::Ok => {}
                Outcome::Error(error) => sink.error(
                    error.descriptor(),
                    error.to_string(),
                    Some(site.location.clone()),
                ),
                Outcome::Note => sink.note(
                    &codes::UNRESOLVED_NAME,
                    UNRESOLVED_NAME_NOTE,
                    Some(site.location.clone()),
                ),
            }
            report.sites.push(SiteReport {
                location: site.location,
                resolution: site.resolution,
                outcome,
            });
        }
        tracing::debug!(
            target: "check",
            function = report.function.as_str(),
            sites = report.sites.len(),
            errors = report.errors(),
            "checked function"
        );
        report
    }

    /// Select dispatch calls through the context record's slot that pass at
    /// least the two fixed arguments.
    #[must_use]
    pub fn match_call(&self, call: &CallExpr) -> Option<CallSite> {
        let CalleeShape::DispatchSlot { record, field } = &call.callee else {
            return None;
        };
        if field != &self.config.dispatch_field || !self.config.is_context_record(record) {
            return None;
        }
        if call.args.len() < 2 {
            return None;
        }
        Some(CallSite {
            location: call.location.clone(),
            resolution: self.resolve_name(&call.args[1]),
            arguments: call.args.iter().map(supplied_argument).collect(),
        })
    }

    fn resolve_name(&self, argument: &ArgumentView) -> NameResolution {
        match &argument.value {
            ArgumentValue::StringLiteral(name) => NameResolution::Literal(name.clone()),
            ArgumentValue::HelperResult(helper)
                if self.config.name_helpers.iter().any(|known| known == helper) =>
            {
                NameResolution::CandidateSet(self.config.candidate_messages.clone())
            }
            _ => NameResolution::Unresolvable,
        }
    }

    /// Judge a call site. Candidate names are checked in order and the first
    /// failure is reported.
    #[must_use]
    pub fn check_call_site(&self, site: &CallSite) -> Outcome {
        let result = match &site.resolution {
            NameResolution::Unresolvable => return Outcome::Note,
            NameResolution::Literal(name) => self.check_message(name, site, true),
            NameResolution::CandidateSet(names) => names
                .iter()
                .try_for_each(|name| self.check_message(name, site, false)),
        };
        match result {
            Ok(()) => Outcome::Ok,
            Err(error) => Outcome::Error(error),
        }
    }

    fn check_message(
        &self,
        name: &str,
        site: &CallSite,
        literal: bool,
    ) -> Result<(), CallSiteError> {
        let Some(signature) = self.registry.lookup(name) else {
            let message = name.to_string();
            return Err(if literal {
                CallSiteError::UnknownMessage { message }
            } else {
                CallSiteError::NotRegistered { message }
            });
        };
        if site.arguments.len() != signature.call_arity() {
            return Err(CallSiteError::ArgumentCount {
                message: name.to_string(),
                expected: signature.parameter_types.len(),
                got: site.message_argument_count(),
            });
        }
        let supplied = &site.arguments[2..];
        for (index, (expected, given)) in signature
            .parameter_types
            .iter()
            .zip(supplied)
            .enumerate()
        {
            if !self.rules.argument_satisfies(expected, given) {
                return Err(CallSiteError::ArgumentType {
                    expected: expected.clone(),
                    given: given.ty.raw_spelling.clone(),
                    position: index + 1,
                });
            }
        }
        Ok(())
    }
}

fn supplied_argument(view: &ArgumentView) -> SuppliedArgument {
    match view.value {
        ArgumentValue::IntLiteral(value) => {
            SuppliedArgument::integer_literal(view.ty.as_str(), value)
        }
        _ => SuppliedArgument::new(view.ty.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    struct FakeFunction {
        calls: Vec<CallExpr>,
    }

    impl FunctionView for FakeFunction {
        fn name(&self) -> &str {
            "fake"
        }

        fn call_expressions(&self) -> Vec<CallExpr> {
            self.calls.clone()
        }
    }

    fn arg(ty: &str) -> ArgumentView {
        ArgumentView {
            ty: ty.into(),
            value: ArgumentValue::Opaque,
        }
    }

    fn int(value: i128) -> ArgumentView {
        ArgumentView {
            ty: "int".into(),
            value: ArgumentValue::IntLiteral(value),
        }
    }

    fn name(text: &str) -> ArgumentView {
        ArgumentView {
            ty: format!("char[{}]", text.len() + 1),
            value: ArgumentValue::StringLiteral(text.into()),
        }
    }

    fn dispatch(line: u32, args: Vec<ArgumentView>) -> CallExpr {
        let mut all = vec![arg("pcmk__output_t *")];
        all.extend(args);
        CallExpr {
            location: Location::new("pe_output.c", line, 5),
            callee: CalleeShape::DispatchSlot {
                record: "pcmk__output_t".into(),
                field: "message".into(),
            },
            args: all,
        }
    }

    fn registry(entries: Vec<(&str, Vec<&str>)>) -> SignatureRegistry {
        let mut registry = SignatureRegistry::new();
        for (message, params) in entries {
            registry
                .register(message, params.into_iter().map(ToString::to_string).collect())
                .expect("register");
        }
        registry
    }

    fn outcome_of(registry: &SignatureRegistry, call: CallExpr) -> Outcome {
        let config = CheckConfig::default();
        let validator = Validator::new(registry, &config);
        let site = validator.match_call(&call).expect("dispatch call matches");
        validator.check_call_site(&site)
    }

    #[test]
    fn argument_count_mismatch_reports_expected_and_got() {
        let registry = registry(vec![("node", vec!["pcmk_node_t *", "bool", "bool", "const char *"])]);
        let outcome = outcome_of(
            &registry,
            dispatch(
                1,
                vec![name("node"), arg("pcmk_node_t *"), arg("bool"), arg("bool")],
            ),
        );
        let Outcome::Error(error) = outcome else {
            panic!("expected count error, found {outcome:?}");
        };
        assert_eq!(
            error.to_string(),
            "Expected 4 arguments to message node, but got 3"
        );
    }

    #[test]
    fn unsigned_max_literal_satisfies_integer_parameter() {
        let registry = registry(vec![("limit", vec!["size_t", "const char *"])]);
        let size_max = ArgumentView {
            ty: "long unsigned int".into(),
            value: ArgumentValue::IntLiteral(i128::from(u64::MAX)),
        };
        assert_eq!(
            outcome_of(
                &registry,
                dispatch(1, vec![name("limit"), size_max, arg("char *")])
            ),
            Outcome::Ok
        );
    }

    #[test]
    fn integer_literal_and_null_escapes() {
        let registry = registry(vec![("attr", vec!["unsigned int"]), ("owner", vec!["struct pe_node_t *"])]);
        assert_eq!(
            outcome_of(&registry, dispatch(1, vec![name("attr"), int(0)])),
            Outcome::Ok
        );
        assert_eq!(
            outcome_of(&registry, dispatch(2, vec![name("owner"), int(0)])),
            Outcome::Ok
        );
        assert_eq!(
            outcome_of(&registry, dispatch(3, vec![name("owner"), int(1)])),
            Outcome::Error(CallSiteError::ArgumentType {
                expected: "struct pe_node_t *".into(),
                given: "int".into(),
                position: 1,
            })
        );
    }

    #[test]
    fn const_compatibility_is_one_directional() {
        let registry = registry(vec![("text", vec!["const char *"]), ("buffer", vec!["char *"])]);
        assert_eq!(
            outcome_of(&registry, dispatch(1, vec![name("text"), arg("char *")])),
            Outcome::Ok
        );
        let outcome = outcome_of(&registry, dispatch(2, vec![name("buffer"), arg("const char *")]));
        let Outcome::Error(error) = outcome else {
            panic!("expected type error, found {outcome:?}");
        };
        assert_eq!(
            error.to_string(),
            "Expected 'char *', but got 'const char *' in argument 1"
        );
    }

    #[test]
    fn first_type_mismatch_wins() {
        let registry = registry(vec![("pair", vec!["int", "const char *", "bool"])]);
        let outcome = outcome_of(
            &registry,
            dispatch(1, vec![name("pair"), arg("int"), arg("double"), arg("char *")]),
        );
        assert_eq!(
            outcome,
            Outcome::Error(CallSiteError::ArgumentType {
                expected: "const char *".into(),
                given: "double".into(),
                position: 2,
            })
        );
    }

    #[test]
    fn literal_and_candidate_names_use_distinct_messages() {
        let registry = registry(vec![("bundle", vec!["pcmk_resource_t *"])]);
        let outcome = outcome_of(&registry, dispatch(1, vec![name("nodes")]));
        assert_eq!(
            outcome,
            Outcome::Error(CallSiteError::UnknownMessage {
                message: "nodes".into()
            })
        );
        assert_eq!(
            CallSiteError::UnknownMessage {
                message: "nodes".into()
            }
            .to_string(),
            "Unknown format message: nodes"
        );

        let helper = ArgumentView {
            ty: "const char *".into(),
            value: ArgumentValue::HelperResult("crm_map_element_name".into()),
        };
        let outcome = outcome_of(
            &registry,
            dispatch(2, vec![helper, arg("pcmk_resource_t *")]),
        );
        let Outcome::Error(error) = outcome else {
            panic!("expected unregistered candidate, found {outcome:?}");
        };
        assert_eq!(error.to_string(), "Message not registered: clone");
    }

    #[test]
    fn candidate_set_short_circuits_on_first_failure() {
        let registry = registry(vec![
            ("bundle", vec!["pcmk_resource_t *", "bool"]),
            ("clone", vec!["pcmk_resource_t *"]),
            ("group", vec!["pcmk_resource_t *"]),
            ("primitive", vec!["pcmk_resource_t *"]),
        ]);
        let helper = ArgumentView {
            ty: "const char *".into(),
            value: ArgumentValue::HelperResult("crm_element_name".into()),
        };
        let mut sink = DiagnosticSink::new();
        let config = CheckConfig::default();
        let validator = Validator::new(&registry, &config);
        let function = FakeFunction {
            calls: vec![dispatch(7, vec![helper, arg("pcmk_resource_t *")])],
        };
        let report = validator.check_function(&function, &mut sink);
        assert_eq!(report.errors(), 1);
        assert_eq!(sink.count(Severity::Error), 1, "only the first failure is reported");
        assert_eq!(
            sink.diagnostics()[0].message,
            "Expected 2 arguments to message bundle, but got 1"
        );
    }

    #[test]
    fn unresolvable_name_emits_single_note() {
        let registry = registry(Vec::new());
        let config = CheckConfig::default();
        let validator = Validator::new(&registry, &config);
        let mut sink = DiagnosticSink::new();
        let function = FakeFunction {
            calls: vec![dispatch(9, vec![arg("const char *"), int(3)])],
        };
        let report = validator.check_function(&function, &mut sink);
        assert_eq!(report.notes(), 1);
        assert!(!sink.has_errors());
        assert_eq!(sink.count(Severity::Note), 1);
        assert_eq!(sink.diagnostics()[0].message, UNRESOLVED_NAME_NOTE);
        assert_eq!(
            sink.diagnostics()[0].location,
            Some(Location::new("pe_output.c", 9, 5))
        );
    }

    #[test]
    fn non_dispatch_calls_and_short_calls_are_skipped() {
        let registry = registry(Vec::new());
        let config = CheckConfig::default();
        let validator = Validator::new(&registry, &config);
        let mut other_record = dispatch(1, vec![name("x")]);
        other_record.callee = CalleeShape::DispatchSlot {
            record: "pcmk__output_s".into(),
            field: "message".into(),
        };
        let mut other_field = dispatch(2, vec![name("x")]);
        other_field.callee = CalleeShape::DispatchSlot {
            record: "struct pcmk__output_t".into(),
            field: "info".into(),
        };
        let mut direct = dispatch(3, vec![name("x")]);
        direct.callee = CalleeShape::Direct("printf".into());
        let short = dispatch(4, Vec::new());

        let mut sink = DiagnosticSink::new();
        let function = FakeFunction {
            calls: vec![other_record, other_field, direct, short],
        };
        let report = validator.check_function(&function, &mut sink);
        assert!(report.sites.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn run_pass_only_checks_late_stage() {
        let registry = registry(Vec::new());
        let config = CheckConfig::default();
        let validator = Validator::new(&registry, &config);
        let function = FakeFunction {
            calls: vec![dispatch(1, vec![name("missing")])],
        };
        let mut sink = DiagnosticSink::new();
        assert!(validator.run_pass("ssa", &function, &mut sink).is_none());
        assert!(sink.is_empty());

        let report = validator
            .run_pass("*warn_function_return", &function, &mut sink)
            .expect("late stage runs");
        assert_eq!(report.errors(), 1);
        assert_eq!(sink.diagnostics()[0].to_string(), "error[MSG0001]: Unknown format message: missing");
    }

    #[test]
    fn aliases_and_supplementary_rules_apply_at_call_sites() {
        let registry = registry(vec![(
            "fencing",
            vec!["pcmk__fence_history", "bool", "GList *", "pcmk__cluster_option_t *"],
        )]);
        let outcome = outcome_of(
            &registry,
            dispatch(
                1,
                vec![
                    name("fencing"),
                    arg("int"),
                    arg("int"),
                    arg("struct GList *"),
                    arg("struct pcmk__cluster_option_t[42] *"),
                ],
            ),
        );
        assert_eq!(outcome, Outcome::Ok);
    }
}
