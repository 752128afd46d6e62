use std::collections::HashMap;

use crate::diagnostics::Location;
use crate::types::CType;

use super::{Callee, FunctionBody, Operand, Rvalue, StatementKind};

const UNKNOWN_TYPE: &str = "<unknown>";
const MAX_COPY_CHAIN: usize = 8;

/// What the validator needs from a host function body.
pub trait FunctionView {
    fn name(&self) -> &str;

    /// Every call in the body, blocks first then statements, in program order.
    fn call_expressions(&self) -> Vec<CallExpr>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallExpr {
    pub location: Location,
    pub callee: CalleeShape,
    pub args: Vec<ArgumentView>,
}

/// How the called function was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalleeShape {
    /// Function pointer loaded from `field` of a `record` value, by a single
    /// definition.
    DispatchSlot { record: String, field: String },
    Direct(String),
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentView {
    /// Static type spelling.
    pub ty: String,
    pub value: ArgumentValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentValue {
    IntLiteral(i128),
    StringLiteral(String),
    /// Result of a direct call to the named function.
    HelperResult(String),
    Opaque,
}

impl FunctionView for FunctionBody {
    fn name(&self) -> &str {
        &self.name
    }

    fn call_expressions(&self) -> Vec<CallExpr> {
        let resolver = Resolver::new(self);
        let mut calls = Vec::new();
        for block in &self.blocks {
            for statement in &block.statements {
                let StatementKind::Call { callee, args, .. } = &statement.kind else {
                    continue;
                };
                calls.push(CallExpr {
                    location: Location::new(&self.file, statement.line, statement.column),
                    callee: resolver.callee(callee),
                    args: args.iter().map(|arg| resolver.argument(arg)).collect(),
                });
            }
        }
        calls
    }
}

struct Resolver<'a> {
    definitions: HashMap<&'a str, Vec<&'a StatementKind>>,
    types: HashMap<&'a str, &'a str>,
}

impl<'a> Resolver<'a> {
    fn new(body: &'a FunctionBody) -> Self {
        let mut definitions: HashMap<&str, Vec<&StatementKind>> = HashMap::new();
        for statement in body.blocks.iter().flat_map(|block| &block.statements) {
            if let Some(local) = statement.kind.defines() {
                definitions.entry(local).or_default().push(&statement.kind);
            }
        }
        let types = body
            .locals
            .iter()
            .map(|local| (local.name.as_str(), local.ty.as_str()))
            .collect();
        Self { definitions, types }
    }

    /// The defining statement of `local` when there is exactly one.
    fn unique_definition(&self, local: &str) -> Option<&'a StatementKind> {
        match self.definitions.get(local).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }

    fn callee(&self, callee: &Callee) -> CalleeShape {
        match callee {
            Callee::Direct { name } => CalleeShape::Direct(name.clone()),
            Callee::Indirect { local } => match self.unique_definition(local) {
                Some(StatementKind::Assign {
                    value: Rvalue::Field { object, field },
                    ..
                }) => self
                    .record_of(object)
                    .map_or(CalleeShape::Other, |record| CalleeShape::DispatchSlot {
                        record,
                        field: field.clone(),
                    }),
                _ => CalleeShape::Other,
            },
        }
    }

    /// Record name behind `object`, with any `struct` tag removed.
    fn record_of(&self, object: &str) -> Option<String> {
        let parsed = CType::parse(self.types.get(object)?);
        let target = parsed.pointee().unwrap_or(&parsed).unqualified();
        match target {
            CType::Named(name) => Some(name.strip_prefix("struct ").unwrap_or(name).to_string()),
            _ => None,
        }
    }

    fn argument(&self, operand: &Operand) -> ArgumentView {
        match operand {
            Operand::Local { id } => ArgumentView {
                ty: self
                    .types
                    .get(id.as_str())
                    .map_or_else(|| UNKNOWN_TYPE.to_string(), |ty| (*ty).to_string()),
                value: self.value_of(id, 0),
            },
            Operand::Int { value, ty } => ArgumentView {
                ty: ty.clone(),
                value: ArgumentValue::IntLiteral(*value),
            },
            Operand::Str { value, ty } => ArgumentView {
                ty: ty
                    .clone()
                    .unwrap_or_else(|| format!("char[{}]", value.len() + 1)),
                value: ArgumentValue::StringLiteral(value.clone()),
            },
            Operand::Other { ty } => ArgumentView {
                ty: ty.clone(),
                value: ArgumentValue::Opaque,
            },
        }
    }

    fn value_of(&self, local: &str, depth: usize) -> ArgumentValue {
        if depth > MAX_COPY_CHAIN {
            return ArgumentValue::Opaque;
        }
        match self.unique_definition(local) {
            Some(StatementKind::Call {
                callee: Callee::Direct { name },
                ..
            }) => ArgumentValue::HelperResult(name.clone()),
            Some(StatementKind::Assign {
                value:
                    Rvalue::Use {
                        operand: Operand::Local { id },
                    },
                ..
            }) => self.value_of(id, depth + 1),
            _ => ArgumentValue::Opaque,
        }
    }
}
