//! Step tree definitions
//!
//! A [`Step`] describes one Python construct. Built-in constructs are strongly typed variants;
//! caller-defined constructs travel as [`Step::Custom`] with their raw attributes.
//!
//! Expression-level fields are plain source text supplied by the caller and are emitted
//! verbatim. Bodies own their nested steps, so a program is a single-owner tree.

use serde_json::{Map, Value};

use crate::decode::{self, Fields};
use crate::errors::DecodeError;
use crate::tags::{self, ConstructId};

/// A program is an ordered sequence of top-level steps.
pub type Program = Vec<Step>;

/// One node of the step tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `#!/usr/bin/env python3`
    Shebang(String),
    /// `# -*- coding: utf-8 -*-`
    Encoding(String),
    /// `import a as b, c`
    Import(ImportStmt),
    /// `from module import a, b as c`
    FromImport(FromImportStmt),
    /// `from __future__ import annotations`
    FutureImport(Vec<String>),
    /// `import importlib` + `name = importlib.import_module('module')`
    ImportlibImport(ImportlibImport),
    /// `a, *rest = value`
    Assign(AssignStmt),
    /// `target: annotation = value`
    Annotation(AnnAssignStmt),
    /// `target += value`
    AugAssign(AugAssignStmt),
    /// `__version__ = "1.0"`
    Dunder(DunderStmt),
    /// `type Vector = list[float]`
    TypeAlias(TypeAliasStmt),
    /// Expression statement
    Expr(String),
    /// `target = name(args, key=value)`
    FuncCall(CallStmt),
    /// `target = lambda args: expr`
    Lambda(LambdaStmt),
    /// List, set and generator comprehensions
    Comprehension(Comprehension),
    /// `{key: value for var in iterable}`
    DictComp(DictComp),
    /// `(target := expr)`
    Walrus(WalrusExpr),
    /// `f"{expr=}"`
    FStringDebug(String),
    /// `then if cond else other`
    CondExpr(CondExpr),
    /// `a < b <= c`
    ChainedComparison(ChainedComparison),
    /// `exec(...)` / `eval(...)`
    Dynamic(DynamicCode),
    /// `def` / `async def`
    FunctionDef(FunctionDef),
    /// `class` / `@dataclass class`
    ClassDef(ClassDef),
    /// Standalone `@name` or `@name(args)` line
    Decorator(Decorator),
    /// Standalone `@name(args)` line; parentheses are always emitted
    DecoratorFactory(Decorator),
    /// `[T, U]` type-parameter list
    TypeParams(Vec<String>),
    /// `if cond: ... elif cond: ... else: ...`
    If(IfStmt),
    /// Standalone `elif cond: ...` clause; nested `elifs` / `orelse` continue the chain
    Elif(IfStmt),
    /// Standalone `else: ...` clause
    Else(Vec<Step>),
    /// `for var in iterable: ...` / `async for`
    For(ForStmt),
    /// `while cond: ...`
    While(WhileStmt),
    /// `try: ... except E as e: ... else: ... finally: ...`
    Try(TryStmt),
    /// `with a as b, c: ...` / `async with`
    With(WithStmt),
    /// `match subject:` followed by `case` steps
    Match(MatchStmt),
    /// `case pattern as name if guard: ...`
    Case(MatchCase),
    /// `if __name__ == '__main__': ...`
    MainGuard(Vec<Step>),
    /// `return [value]`
    Return(Option<String>),
    /// `raise [exception [from cause]]`
    Raise(RaiseStmt),
    /// `assert cond[, msg]`
    Assert(AssertStmt),
    /// `yield [value]`
    Yield(Option<String>),
    /// `yield from expr`
    YieldFrom(String),
    /// `[target = ]await expr`
    Await(AwaitStmt),
    Break,
    Continue,
    Pass,
    /// `del a, b`
    Del(Vec<String>),
    /// `global a, b`
    Global(Vec<String>),
    /// `nonlocal a, b`
    Nonlocal(Vec<String>),
    /// Empty lines (count)
    BlankLine(usize),
    /// `# text`
    Comment(String),
    /// `"""text"""`
    Docstring(String),
    /// `# type: ignore`
    MypyPragma(String),
    /// Caller-defined construct, resolved by tag at emission time.
    Custom(CustomStep),
}

// ============================================================================
// Imports
// ============================================================================

/// `name [as alias]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportAlias {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportStmt {
    pub modules: Vec<ImportAlias>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FromImportStmt {
    /// Module path; may be empty for `from . import x`.
    pub module: String,
    pub names: Vec<ImportAlias>,
    /// Number of leading dots for relative imports.
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportlibImport {
    pub module: String,
    pub alias: Option<String>,
}

// ============================================================================
// Bindings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignStmt {
    /// One target, or several for sequence unpacking (`a, *rest, b`).
    pub targets: Vec<String>,
    pub value: String,
    /// Trailing `# type: ...` comment.
    pub type_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnAssignStmt {
    pub target: String,
    pub annotation: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AugAssignStmt {
    pub target: String,
    /// Operator, with or without the trailing `=` (`+` and `+=` are equivalent).
    pub op: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DunderStmt {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeAliasStmt {
    pub name: String,
    pub type_params: Vec<String>,
    pub value: String,
}

// ============================================================================
// Expression statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallStmt {
    pub func: String,
    pub args: Vec<String>,
    pub kwargs: Vec<(String, String)>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LambdaStmt {
    pub params: Vec<String>,
    pub body: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompKind {
    #[default]
    List,
    Set,
    Generator,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comprehension {
    pub kind: CompKind,
    pub element: String,
    pub var: String,
    pub iterable: String,
    pub condition: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DictComp {
    pub key: String,
    pub value: String,
    pub var: String,
    pub iterable: String,
    pub condition: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalrusExpr {
    pub target: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CondExpr {
    pub then: String,
    pub condition: String,
    pub orelse: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainedComparison {
    /// Operands and operators in order: `["a", "<", "b", "<=", "c"]`.
    pub parts: Vec<String>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicKind {
    #[default]
    Exec,
    Eval,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicCode {
    pub kind: DynamicKind,
    pub source: String,
    pub globals: Option<String>,
    pub locals: Option<String>,
    pub target: Option<String>,
}

// ============================================================================
// Definitions
// ============================================================================

/// A single parameter: `name[: annotation][ = default]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Function parameter list, in signature order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameters {
    pub positional_only: Vec<Param>,
    pub args: Vec<Param>,
    pub vararg: Option<Param>,
    pub keyword_only: Vec<Param>,
    pub kwarg: Option<Param>,
}

impl Parameters {
    pub fn is_empty(&self) -> bool {
        self.positional_only.is_empty()
            && self.args.is_empty()
            && self.vararg.is_none()
            && self.keyword_only.is_empty()
            && self.kwarg.is_none()
    }

    /// Every parameter, in signature order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.positional_only
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.keyword_only.iter())
            .chain(self.kwarg.iter())
    }
}

/// `@name` or `@name(args)` for decorator factories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decorator {
    pub name: String,
    pub args: Option<Vec<String>>,
}

impl Decorator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
        }
    }

    pub fn factory(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDef {
    pub is_async: bool,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Parameters,
    pub returns: Option<String>,
    pub decorators: Vec<Decorator>,
    pub docstring: Option<String>,
    pub body: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassKind {
    #[default]
    Plain,
    /// `@dataclass` or `@dataclass(key=value, ...)`
    Dataclass { args: Vec<(String, String)> },
}

/// Annotated class-level field: `name: annotation[ = default]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDecl {
    pub name: String,
    pub annotation: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDef {
    pub kind: ClassKind,
    pub name: String,
    pub type_params: Vec<String>,
    pub bases: Vec<String>,
    /// Class keywords such as `metaclass=Meta`, in order.
    pub keywords: Vec<(String, String)>,
    pub decorators: Vec<Decorator>,
    pub docstring: Option<String>,
    pub slots: Option<Vec<String>>,
    pub fields: Vec<FieldDecl>,
    pub body: Vec<Step>,
}

// ============================================================================
// Compound statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElifClause {
    pub condition: String,
    pub body: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IfStmt {
    pub condition: String,
    pub body: Vec<Step>,
    pub elifs: Vec<ElifClause>,
    /// `Some(vec![])` renders `else:` with a `pass` suite.
    pub orelse: Option<Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForStmt {
    pub is_async: bool,
    pub target: String,
    pub iterable: String,
    pub body: Vec<Step>,
    pub orelse: Option<Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhileStmt {
    pub condition: String,
    pub body: Vec<Step>,
    pub orelse: Option<Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExceptHandler {
    /// `None` renders a bare `except:`.
    pub exception: Option<String>,
    pub name: Option<String>,
    pub body: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TryStmt {
    pub body: Vec<Step>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Option<Vec<Step>>,
    pub finalbody: Option<Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithStmt {
    pub is_async: bool,
    /// Context items as written: `open(path) as f`.
    pub items: Vec<String>,
    pub body: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchStmt {
    pub subject: String,
    /// Ordered `case` steps.
    pub cases: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchCase {
    pub pattern: String,
    pub binding: Option<String>,
    pub guard: Option<String>,
    pub body: Vec<Step>,
}

// ============================================================================
// Control transfer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RaiseStmt {
    pub exception: Option<String>,
    pub cause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertStmt {
    pub condition: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AwaitStmt {
    pub expr: String,
    pub target: Option<String>,
}

// ============================================================================
// Custom steps
// ============================================================================

/// A step whose tag is not a built-in construct.
///
/// Attributes are kept as raw JSON in the order the caller supplied them; the typed
/// accessors produce the same errors the built-in decoder does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomStep {
    pub tag: String,
    pub attrs: Map<String, Value>,
}

impl CustomStep {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Map::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    fn fields(&self) -> Fields<'_> {
        Fields::new(&self.tag, &self.attrs)
    }

    /// Required text attribute (strings, numbers and booleans are accepted).
    pub fn text(&self, key: &str) -> Result<String, DecodeError> {
        self.fields().text(key)
    }

    pub fn opt_text(&self, key: &str) -> Result<Option<String>, DecodeError> {
        self.fields().opt_text(key)
    }

    /// A string or a list of strings; missing attributes yield an empty list.
    pub fn text_list(&self, key: &str) -> Result<Vec<String>, DecodeError> {
        self.fields().text_or_list(key)
    }

    /// Decode a nested body attribute into steps; missing attributes yield an empty body.
    pub fn steps(&self, key: &str) -> Result<Vec<Step>, DecodeError> {
        decode::Decoder::new().body(&self.fields(), key)
    }
}

// ============================================================================
// Step API
// ============================================================================

impl Step {
    /// Built-in construct identity, `None` for custom steps.
    pub fn construct(&self) -> Option<ConstructId> {
        use ConstructId as C;
        let id = match self {
            Step::Shebang(_) => C::Shebang,
            Step::Encoding(_) => C::Encoding,
            Step::Import(_) => C::Import,
            Step::FromImport(_) => C::FromImport,
            Step::FutureImport(_) => C::FutureImport,
            Step::ImportlibImport(_) => C::ImportlibImport,
            Step::Assign(_) => C::Assign,
            Step::Annotation(_) => C::Annotation,
            Step::AugAssign(_) => C::AugAssign,
            Step::Dunder(_) => C::Dunder,
            Step::TypeAlias(_) => C::TypeAlias,
            Step::Expr(_) => C::Expr,
            Step::FuncCall(_) => C::FuncCall,
            Step::Lambda(_) => C::Lambda,
            Step::Comprehension(c) => match c.kind {
                CompKind::List => C::ListComp,
                CompKind::Set => C::SetComp,
                CompKind::Generator => C::GeneratorExpr,
            },
            Step::DictComp(_) => C::DictComp,
            Step::Walrus(_) => C::Walrus,
            Step::FStringDebug(_) => C::FStringDebug,
            Step::CondExpr(_) => C::CondExpr,
            Step::ChainedComparison(_) => C::ChainedComparison,
            Step::Dynamic(d) => match d.kind {
                DynamicKind::Exec => C::Exec,
                DynamicKind::Eval => C::Eval,
            },
            Step::FunctionDef(f) if f.is_async => C::AsyncFuncDef,
            Step::FunctionDef(_) => C::FuncDef,
            Step::ClassDef(c) => match c.kind {
                ClassKind::Plain => C::ClassDef,
                ClassKind::Dataclass { .. } => C::Dataclass,
            },
            Step::Decorator(_) => C::Decorator,
            Step::DecoratorFactory(_) => C::DecoratorFactory,
            Step::TypeParams(_) => C::TypeParams,
            Step::If(_) => C::If,
            Step::Elif(_) => C::Elif,
            Step::Else(_) => C::Else,
            Step::For(f) if f.is_async => C::AsyncFor,
            Step::For(_) => C::For,
            Step::While(_) => C::While,
            Step::Try(_) => C::Try,
            Step::With(w) if w.is_async => C::AsyncWith,
            Step::With(_) => C::With,
            Step::Match(_) => C::Match,
            Step::Case(_) => C::Case,
            Step::MainGuard(_) => C::MainGuard,
            Step::Return(_) => C::Return,
            Step::Raise(_) => C::Raise,
            Step::Assert(_) => C::Assert,
            Step::Yield(_) => C::Yield,
            Step::YieldFrom(_) => C::YieldFrom,
            Step::Await(_) => C::Await,
            Step::Break => C::Break,
            Step::Continue => C::Continue,
            Step::Pass => C::Pass,
            Step::Del(_) => C::Del,
            Step::Global(_) => C::Global,
            Step::Nonlocal(_) => C::Nonlocal,
            Step::BlankLine(_) => C::BlankLine,
            Step::Comment(_) => C::Comment,
            Step::Docstring(_) => C::Docstring,
            Step::MypyPragma(_) => C::MypyPragma,
            Step::Custom(_) => return None,
        };
        Some(id)
    }

    /// Discriminant tag used for handler lookup.
    pub fn tag(&self) -> &str {
        match self {
            Step::Custom(custom) => &custom.tag,
            other => match other.construct() {
                Some(id) => tags::as_str(id),
                None => unreachable!("only custom steps lack a construct id"),
            },
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Step::Custom(_))
    }

    /// Nested step lists owned by this step, with their attribute names.
    pub fn children(&self) -> Vec<(&'static str, &[Step])> {
        match self {
            Step::FunctionDef(f) => vec![("body", f.body.as_slice())],
            Step::ClassDef(c) => vec![("body", c.body.as_slice())],
            Step::If(s) | Step::Elif(s) => {
                let mut out = vec![("body", s.body.as_slice())];
                out.extend(s.elifs.iter().map(|e| ("elif", e.body.as_slice())));
                out.extend(s.orelse.iter().map(|b| ("else", b.as_slice())));
                out
            }
            Step::For(s) => {
                let mut out = vec![("body", s.body.as_slice())];
                out.extend(s.orelse.iter().map(|b| ("else", b.as_slice())));
                out
            }
            Step::While(s) => {
                let mut out = vec![("body", s.body.as_slice())];
                out.extend(s.orelse.iter().map(|b| ("else", b.as_slice())));
                out
            }
            Step::Try(s) => {
                let mut out = vec![("body", s.body.as_slice())];
                out.extend(s.handlers.iter().map(|h| ("except", h.body.as_slice())));
                out.extend(s.orelse.iter().map(|b| ("else", b.as_slice())));
                out.extend(s.finalbody.iter().map(|b| ("finally", b.as_slice())));
                out
            }
            Step::With(s) => vec![("body", s.body.as_slice())],
            Step::Match(s) => vec![("cases", s.cases.as_slice())],
            Step::Case(s) => vec![("body", s.body.as_slice())],
            Step::MainGuard(body) => vec![("body", body.as_slice())],
            Step::Else(body) => vec![("body", body.as_slice())],
            _ => Vec::new(),
        }
    }

    /// Decode a custom step as a built-in construct.
    ///
    /// Used when a hand-built [`CustomStep`] is dispatched to a built-in handler: its attributes
    /// are decoded as if it carried `tag`.
    pub fn from_custom_as(custom: &CustomStep, tag: &str) -> Result<Step, DecodeError> {
        decode::Decoder::new().step_with_tag(tag, &custom.attrs)
    }

    // ------------------------------------------------------------------------
    // Convenience constructors
    // ------------------------------------------------------------------------

    pub fn expr(expr: impl Into<String>) -> Step {
        Step::Expr(expr.into())
    }

    pub fn assign(target: impl Into<String>, value: impl Into<String>) -> Step {
        Step::Assign(AssignStmt {
            targets: vec![target.into()],
            value: value.into(),
            type_comment: None,
        })
    }

    pub fn comment(text: impl Into<String>) -> Step {
        Step::Comment(text.into())
    }

    pub fn ret(value: impl Into<String>) -> Step {
        Step::Return(Some(value.into()))
    }

    pub fn blank() -> Step {
        Step::BlankLine(1)
    }

    pub fn import(module: impl Into<String>) -> Step {
        Step::Import(ImportStmt {
            modules: vec![ImportAlias::new(module)],
        })
    }

    pub fn if_(condition: impl Into<String>, body: Vec<Step>) -> Step {
        Step::If(IfStmt {
            condition: condition.into(),
            body,
            ..Default::default()
        })
    }

    pub fn while_(condition: impl Into<String>, body: Vec<Step>) -> Step {
        Step::While(WhileStmt {
            condition: condition.into(),
            body,
            orelse: None,
        })
    }

    pub fn for_(target: impl Into<String>, iterable: impl Into<String>, body: Vec<Step>) -> Step {
        Step::For(ForStmt {
            is_async: false,
            target: target.into(),
            iterable: iterable.into(),
            body,
            orelse: None,
        })
    }

    /// `def name(args):` with plain positional parameters.
    pub fn def(name: impl Into<String>, args: &[&str], body: Vec<Step>) -> Step {
        Step::FunctionDef(FunctionDef {
            name: name.into(),
            params: Parameters {
                args: args.iter().map(|a| Param::new(*a)).collect(),
                ..Default::default()
            },
            body,
            ..Default::default()
        })
    }

    pub fn case(pattern: impl Into<String>, body: Vec<Step>) -> Step {
        Step::Case(MatchCase {
            pattern: pattern.into(),
            body,
            ..Default::default()
        })
    }

    pub fn match_(subject: impl Into<String>, cases: Vec<Step>) -> Step {
        Step::Match(MatchStmt {
            subject: subject.into(),
            cases,
        })
    }

    pub fn custom(custom: CustomStep) -> Step {
        Step::Custom(custom)
    }
}

impl From<CustomStep> for Step {
    fn from(custom: CustomStep) -> Self {
        Step::Custom(custom)
    }
}
