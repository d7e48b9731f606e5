//! Define the construct vocabulary: every built-in step discriminant.
//!
//! This module is the single source of truth for step tags: a stable identifier
//! ([`ConstructId`]) plus a const metadata table ([`CONSTRUCTS`]) that records the canonical
//! tag, accepted legacy aliases, the construct kind and a one-line summary.
//!
//! ## Notes
//! - Lookup via [`from_str`] is case-sensitive and accepts aliases.
//! - Aliases are normalized while decoding; a decoded [`crate::Step`] always reports its
//!   canonical tag.
//! - Tags that are not in this table are not errors here: they decode to
//!   [`crate::Step::Custom`] and are resolved against the handler registry at emission time.
//!
//! ## Examples
//! ```rust
//! use pystep_syntax::tags::{self, ConstructId};
//!
//! assert_eq!(tags::from_str("func_def"), Some(ConstructId::FuncDef));
//! assert_eq!(tags::from_str("magic_method"), Some(ConstructId::FuncDef)); // alias
//! assert_eq!(tags::as_str(ConstructId::If), "if");
//! ```

/// Stable identifier for every built-in construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructId {
    // Module markers / imports
    Shebang,
    Encoding,
    Import,
    FromImport,
    FutureImport,
    ImportlibImport,

    // Bindings
    Assign,
    Annotation,
    AugAssign,
    Dunder,
    TypeAlias,

    // Expression statements
    Expr,
    FuncCall,
    Lambda,
    ListComp,
    SetComp,
    GeneratorExpr,
    DictComp,
    Walrus,
    FStringDebug,
    CondExpr,
    ChainedComparison,
    Exec,
    Eval,

    // Definitions
    FuncDef,
    AsyncFuncDef,
    ClassDef,
    Dataclass,
    Decorator,
    DecoratorFactory,
    TypeParams,

    // Compound statements
    If,
    Elif,
    Else,
    For,
    AsyncFor,
    While,
    Try,
    With,
    AsyncWith,
    Match,
    Case,
    MainGuard,

    // Control transfer
    Return,
    Raise,
    Assert,
    Yield,
    YieldFrom,
    Await,
    Break,
    Continue,
    Pass,
    Del,
    Global,
    Nonlocal,

    // Markers
    BlankLine,
    Comment,
    Docstring,
    MypyPragma,
}

/// How a construct renders, for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    /// Header line plus an indented suite.
    Block,
    /// A single logical statement.
    Simple,
    /// Comments, blank lines and file markers.
    Marker,
}

impl ConstructKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstructKind::Block => "block",
            ConstructKind::Simple => "simple",
            ConstructKind::Marker => "marker",
        }
    }
}

/// Metadata for a construct.
///
/// ## Notes
/// - `canonical` is the tag reported by [`crate::Step::tag`] and used for handler lookup.
/// - `aliases` are accepted in JSON documents and rewritten to `canonical`.
#[derive(Debug, Clone, Copy)]
pub struct ConstructInfo {
    pub id: ConstructId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ConstructKind,
    pub summary: &'static str,
}

pub const SHEBANG: &str = "shebang";
pub const ENCODING: &str = "encoding";
pub const IMPORT: &str = "import";
pub const FROM_IMPORT: &str = "from_import";
pub const FUTURE_IMPORT: &str = "future_import";
pub const IMPORTLIB_IMPORT: &str = "importlib_import";
pub const ASSIGN: &str = "assign";
pub const ANNOTATION: &str = "annotation";
pub const AUG_ASSIGN: &str = "aug_assign";
pub const DUNDER: &str = "dunder";
pub const TYPE_ALIAS: &str = "type_alias";
pub const EXPR: &str = "expr";
pub const FUNC_CALL: &str = "func_call";
pub const LAMBDA: &str = "lambda";
pub const LIST_COMP: &str = "list_comp";
pub const SET_COMP: &str = "set_comp";
pub const GENERATOR_EXPR: &str = "generator_expr";
pub const DICT_COMP: &str = "dict_comp";
pub const WALRUS: &str = "walrus";
pub const FSTRING_DEBUG: &str = "fstring_debug";
pub const COND_EXPR: &str = "cond_expr";
pub const CHAINED_COMPARISON: &str = "chained_comparison";
pub const EXEC: &str = "exec";
pub const EVAL: &str = "eval";
pub const FUNC_DEF: &str = "func_def";
pub const ASYNC_FUNC_DEF: &str = "async_func_def";
pub const CLASS_DEF: &str = "class_def";
pub const DATACLASS: &str = "dataclass";
pub const DECORATOR: &str = "decorator";
pub const DECORATOR_FACTORY: &str = "decorator_factory";
pub const TYPE_PARAMS: &str = "type_params";
pub const IF: &str = "if";
pub const ELIF: &str = "elif";
pub const ELSE: &str = "else";
pub const FOR: &str = "for";
pub const ASYNC_FOR: &str = "async_for";
pub const WHILE: &str = "while";
pub const TRY: &str = "try";
pub const WITH: &str = "with";
pub const ASYNC_WITH: &str = "async_with";
pub const MATCH: &str = "match";
pub const CASE: &str = "case";
pub const MAIN_GUARD: &str = "main_guard";
pub const RETURN: &str = "return";
pub const RAISE: &str = "raise";
pub const ASSERT: &str = "assert";
pub const YIELD: &str = "yield";
pub const YIELD_FROM: &str = "yield_from";
pub const AWAIT: &str = "await";
pub const BREAK: &str = "break";
pub const CONTINUE: &str = "continue";
pub const PASS: &str = "pass";
pub const DEL: &str = "del";
pub const GLOBAL: &str = "global";
pub const NONLOCAL: &str = "nonlocal";
pub const BLANK_LINE: &str = "blank_line";
pub const COMMENT: &str = "comment";
pub const DOCSTRING: &str = "docstring";
pub const MYPY_PRAGMA: &str = "mypy_pragma";

const fn info(
    id: ConstructId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    kind: ConstructKind,
    summary: &'static str,
) -> ConstructInfo {
    ConstructInfo {
        id,
        canonical,
        aliases,
        kind,
        summary,
    }
}

use ConstructId as C;
use ConstructKind::{Block, Marker, Simple};

/// Registry of all built-in constructs, in catalog order.
pub const CONSTRUCTS: &[ConstructInfo] = &[
    info(C::Shebang, SHEBANG, &[], Marker, "interpreter marker `#!...` at column 0"),
    info(C::Encoding, ENCODING, &[], Marker, "source encoding marker `# -*- coding: ... -*-`"),
    info(C::Import, IMPORT, &["multi_alias_import"], Simple, "`import a as b, c`"),
    info(C::FromImport, FROM_IMPORT, &[], Simple, "`from module import names`"),
    info(C::FutureImport, FUTURE_IMPORT, &[], Simple, "`from __future__ import names`"),
    info(C::ImportlibImport, IMPORTLIB_IMPORT, &[], Simple, "dynamic import through `importlib.import_module`"),
    info(C::Assign, ASSIGN, &["unpack_assign"], Simple, "`target = value`, with unpacking targets"),
    info(C::Annotation, ANNOTATION, &[], Simple, "annotated assignment `target: T = value`"),
    info(C::AugAssign, AUG_ASSIGN, &[], Simple, "augmented assignment `target += value`"),
    info(C::Dunder, DUNDER, &[], Simple, "module dunder binding `__all__ = [...]`"),
    info(C::TypeAlias, TYPE_ALIAS, &[], Simple, "`type Name[T] = expr`"),
    info(C::Expr, EXPR, &[], Simple, "bare expression statement"),
    info(C::FuncCall, FUNC_CALL, &[], Simple, "call statement, optionally bound to a target"),
    info(C::Lambda, LAMBDA, &[], Simple, "`lambda args: expr`, optionally bound to a target"),
    info(C::ListComp, LIST_COMP, &[], Simple, "`[expr for var in iterable if cond]`"),
    info(C::SetComp, SET_COMP, &[], Simple, "`{expr for var in iterable if cond}`"),
    info(C::GeneratorExpr, GENERATOR_EXPR, &[], Simple, "`(expr for var in iterable if cond)`"),
    info(C::DictComp, DICT_COMP, &[], Simple, "`{key: value for var in iterable if cond}`"),
    info(C::Walrus, WALRUS, &[], Simple, "assignment expression `(target := expr)`"),
    info(C::FStringDebug, FSTRING_DEBUG, &[], Simple, "self-documenting f-string `f\"{expr=}\"`"),
    info(C::CondExpr, COND_EXPR, &[], Simple, "`then if cond else other`"),
    info(C::ChainedComparison, CHAINED_COMPARISON, &[], Simple, "`a < b < c`"),
    info(C::Exec, EXEC, &[], Simple, "`exec(source, globals, locals)`"),
    info(C::Eval, EVAL, &[], Simple, "`eval(source, globals, locals)`"),
    info(C::FuncDef, FUNC_DEF, &["magic_method"], Block, "function definition"),
    info(C::AsyncFuncDef, ASYNC_FUNC_DEF, &[], Block, "asynchronous function definition"),
    info(C::ClassDef, CLASS_DEF, &["metaclass_class_def"], Block, "class definition"),
    info(C::Dataclass, DATACLASS, &["parameterized_dataclass"], Block, "`@dataclass` record class"),
    info(C::Decorator, DECORATOR, &[], Simple, "standalone `@name` line before a definition"),
    info(C::DecoratorFactory, DECORATOR_FACTORY, &[], Simple, "standalone `@name(args)` line"),
    info(C::TypeParams, TYPE_PARAMS, &[], Simple, "`[T, U]` type-parameter list statement"),
    info(C::If, IF, &[], Block, "`if` / `elif` / `else` chain"),
    info(C::Elif, ELIF, &[], Block, "standalone `elif cond:` clause after an `if` step"),
    info(C::Else, ELSE, &[], Block, "standalone `else:` clause after an `if` or `elif` step"),
    info(C::For, FOR, &[], Block, "`for var in iterable:` with optional `else`"),
    info(C::AsyncFor, ASYNC_FOR, &[], Block, "`async for var in iterable:`"),
    info(C::While, WHILE, &[], Block, "`while cond:` with optional `else`"),
    info(C::Try, TRY, &[], Block, "`try` / `except` / `else` / `finally`"),
    info(C::With, WITH, &["multi_with"], Block, "`with a, b as c:`"),
    info(C::AsyncWith, ASYNC_WITH, &[], Block, "`async with ctx:`"),
    info(C::Match, MATCH, &[], Block, "`match subject:` over ordered `case` steps"),
    info(C::Case, CASE, &[], Block, "`case pattern as name if guard:`"),
    info(C::MainGuard, MAIN_GUARD, &[], Block, "`if __name__ == '__main__':`"),
    info(C::Return, RETURN, &[], Simple, "`return [value]`"),
    info(C::Raise, RAISE, &["raise_from"], Simple, "`raise [exc [from cause]]`"),
    info(C::Assert, ASSERT, &[], Simple, "`assert cond[, msg]`"),
    info(C::Yield, YIELD, &[], Simple, "`yield [value]`"),
    info(C::YieldFrom, YIELD_FROM, &[], Simple, "`yield from expr`"),
    info(C::Await, AWAIT, &[], Simple, "`[target = ]await expr`"),
    info(C::Break, BREAK, &[], Simple, "`break`"),
    info(C::Continue, CONTINUE, &[], Simple, "`continue`"),
    info(C::Pass, PASS, &[], Simple, "`pass`"),
    info(C::Del, DEL, &[], Simple, "`del a, b`"),
    info(C::Global, GLOBAL, &[], Simple, "`global a, b`"),
    info(C::Nonlocal, NONLOCAL, &[], Simple, "`nonlocal a, b`"),
    info(C::BlankLine, BLANK_LINE, &[], Marker, "one or more empty lines"),
    info(C::Comment, COMMENT, &[], Marker, "`# text`, one line per text line"),
    info(C::Docstring, DOCSTRING, &[], Marker, "triple-quoted string literal"),
    info(C::MypyPragma, MYPY_PRAGMA, &[], Marker, "`# type: pragma`"),
];

/// Canonical tag.
pub fn as_str(id: ConstructId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata for a construct.
///
/// ## Panics
/// - Panics if `id` has no entry in [`CONSTRUCTS`]; the guardrail tests keep the table complete.
pub fn info_for(id: ConstructId) -> &'static ConstructInfo {
    CONSTRUCTS
        .iter()
        .find(|c| c.id == id)
        .expect("INVARIANT: every ConstructId has a CONSTRUCTS entry")
}

/// Lookup by tag (canonical or alias).
///
/// ## Returns
/// - `Some(ConstructId)` if the tag names a built-in construct.
/// - `None` for caller-defined tags.
pub fn from_str(tag: &str) -> Option<ConstructId> {
    if let Some(c) = CONSTRUCTS.iter().find(|c| c.canonical == tag) {
        return Some(c.id);
    }
    CONSTRUCTS.iter().find(|c| c.aliases.contains(&tag)).map(|c| c.id)
}

/// Rewrite a legacy alias to its canonical tag; other tags pass through unchanged.
pub fn canonical(tag: &str) -> &str {
    match from_str(tag) {
        Some(id) => as_str(id),
        None => tag,
    }
}
