//! Read-only function bodies handed over by the host compiler.
//!
//! A host adaptor (or an IR dump written by one) fills these structures in at a
//! named pass; the validator only consumes them through [`FunctionView`].

mod view;

pub use view::{ArgumentValue, ArgumentView, CallExpr, CalleeShape, FunctionView};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Every function of one compilation unit as captured at `pass`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub file: PathBuf,
    pub pass: String,
    #[serde(default)]
    pub functions: Vec<FunctionBody>,
}

impl TranslationUnit {
    /// Parse a JSON unit dump. Functions without their own `file` inherit the
    /// unit's.
    ///
    /// # Errors
    ///
    /// Fails when `text` is not a unit dump.
    pub fn parse(text: &str) -> Result<Self> {
        let mut unit: TranslationUnit = serde_json::from_str(text)?;
        for function in &mut unit.functions {
            if function.file.as_os_str().is_empty() {
                function.file.clone_from(&unit.file);
            }
        }
        Ok(unit)
    }

    /// Read and parse a unit dump from disk.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            Error::config(format!("failed to read unit `{}`: {err}", path.display()))
        })?;
        Self::parse(&text).map_err(|err| {
            Error::config(format!("failed to parse unit `{}`: {err}", path.display()))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub name: String,
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub locals: Vec<LocalDecl>,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub name: String,
    pub ty: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: u32,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(flatten)]
    pub kind: StatementKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementKind {
    Assign {
        dest: String,
        value: Rvalue,
    },
    Call {
        #[serde(default)]
        dest: Option<String>,
        callee: Callee,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Other,
}

impl StatementKind {
    /// Local written by this statement, if any.
    #[must_use]
    pub fn defines(&self) -> Option<&str> {
        match self {
            StatementKind::Assign { dest, .. } => Some(dest.as_str()),
            StatementKind::Call { dest, .. } => dest.as_deref(),
            StatementKind::Other => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rvalue {
    Use { operand: Operand },
    /// Load of `field` through the record pointer held in local `object`.
    Field { object: String, field: String },
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    Local {
        id: String,
    },
    Int {
        value: i128,
        #[serde(default = "default_int_type")]
        ty: String,
    },
    /// Address of a string literal.
    Str {
        value: String,
        #[serde(default)]
        ty: Option<String>,
    },
    Other {
        ty: String,
    },
}

fn default_int_type() -> String {
    "int".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Callee {
    Direct { name: String },
    Indirect { local: String },
}
