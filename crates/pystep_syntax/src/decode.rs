//! Decode JSON step documents into [`Step`] trees.
//!
//! A document is either an array of step objects or a single step object. Every step object
//! carries a string `type` plus construct-specific attributes (see [`crate::tags`]).
//!
//! ## Notes
//! - Legacy alias tags are rewritten to their canonical tag.
//! - Unknown tags decode to [`Step::Custom`]; they are only rejected at emission time, when no
//!   handler is registered for them.
//! - Expression attributes accept strings, numbers, booleans and `null`; non-string scalars are
//!   rendered the way Python spells them (`True`, `False`, `None`).
//! - Presence and shape are checked here. Emptiness of required text is checked by the emitter,
//!   so hand-built steps get the same validation.

use serde_json::{Map, Value};

use crate::errors::{DecodeError, PROGRAM, UNTAGGED};
use crate::path::StepPath;
use crate::step::*;
use crate::tags::{self, ConstructId};

/// Interpreter line used when a `shebang` step omits `line`.
pub const DEFAULT_SHEBANG: &str = "/usr/bin/env python3";

/// Encoding used when an `encoding` step omits `encoding`.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Largest `count` a `blank_line` step may carry.
pub const MAX_BLANK_LINES: usize = 100;

/// Deepest relative `level` a `from_import` step may carry.
pub const MAX_IMPORT_LEVEL: usize = 32;

/// Decode a program document (array of steps or a single step object).
#[tracing::instrument(skip_all)]
pub fn decode_program(doc: &Value) -> Result<Program, DecodeError> {
    Decoder::new().program(doc)
}

/// Decode one step object.
pub fn decode_step(value: &Value) -> Result<Step, DecodeError> {
    Decoder::new().child(PROGRAM, "steps", 0, value)
}

/// Render a JSON scalar as Python source text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Null => Some("None".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// Attribute access
// ============================================================================

/// Typed view over the attributes of one step object (or a nested clause object).
pub(crate) struct Fields<'a> {
    tag: &'a str,
    map: &'a Map<String, Value>,
    /// Attribute prefix for nested objects, e.g. `except[1]`.
    scope: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(tag: &'a str, map: &'a Map<String, Value>) -> Self {
        Self {
            tag,
            map,
            scope: String::new(),
        }
    }

    fn nested(&self, scope: String, map: &'a Map<String, Value>) -> Fields<'a> {
        Fields {
            tag: self.tag,
            map,
            scope,
        }
    }

    /// Attribute name as reported in errors.
    fn attr(&self, key: &str) -> String {
        if self.scope.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.scope, key)
        }
    }

    /// `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// First of `keys` that is present, falling back to the first spelling.
    fn pick<'k>(&self, keys: &[&'k str]) -> &'k str {
        keys.iter().copied().find(|k| self.has(k)).unwrap_or(keys[0])
    }

    pub(crate) fn text(&self, key: &str) -> Result<String, DecodeError> {
        match self.get(key) {
            None => Err(DecodeError::malformed(self.tag, &self.attr(key), "is required")),
            Some(v) => scalar_text(v).ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "a string")),
        }
    }

    pub(crate) fn opt_text(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => scalar_text(v)
                .map(Some)
                .ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "a string")),
        }
    }

    fn text_any(&self, keys: &[&str]) -> Result<String, DecodeError> {
        self.text(self.pick(keys))
    }

    fn opt_text_any(&self, keys: &[&str]) -> Result<Option<String>, DecodeError> {
        self.opt_text(self.pick(keys))
    }

    /// A string or a list of strings; absent means empty.
    pub(crate) fn text_or_list(&self, key: &str) -> Result<Vec<String>, DecodeError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| scalar_text(v).ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "a list of strings")))
                .collect(),
            Some(v) => scalar_text(v)
                .map(|s| vec![s])
                .ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "a string or a list of strings")),
        }
    }

    /// An object of scalars, in document order; absent means empty.
    fn pairs(&self, key: &str) -> Result<Vec<(String, String)>, DecodeError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| {
                    scalar_text(v)
                        .map(|s| (k.clone(), s))
                        .ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "an object of strings"))
                })
                .collect(),
            Some(_) => Err(DecodeError::mismatch(self.tag, &self.attr(key), "an object")),
        }
    }

    /// A non-negative integer no larger than `max`.
    fn count(&self, key: &str, max: usize) -> Result<Option<usize>, DecodeError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let n = value
            .as_u64()
            .ok_or_else(|| DecodeError::mismatch(self.tag, &self.attr(key), "a non-negative integer"))?;
        match usize::try_from(n) {
            Ok(n) if n <= max => Ok(Some(n)),
            _ => Err(DecodeError::malformed(self.tag, &self.attr(key), format!("must be at most {}", max))),
        }
    }

    /// A list of objects, or a single object; absent means empty.
    fn objects(&self, key: &str) -> Result<Vec<Fields<'a>>, DecodeError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Object(map)) => Ok(vec![self.nested(self.attr(key), map)]),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(self.nested(format!("{}[{}]", self.attr(key), i), map)),
                    _ => Err(DecodeError::mismatch(self.tag, &self.attr(key), "a list of objects")),
                })
                .collect(),
            Some(_) => Err(DecodeError::mismatch(self.tag, &self.attr(key), "an object or a list of objects")),
        }
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Recursive decoder that tracks the breadcrumb of the step being decoded.
pub(crate) struct Decoder {
    path: StepPath,
}

impl Decoder {
    pub(crate) fn new() -> Self {
        Self { path: StepPath::new() }
    }

    fn program(&mut self, doc: &Value) -> Result<Program, DecodeError> {
        match doc {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.child(PROGRAM, "steps", i, item))
                .collect(),
            Value::Object(_) => Ok(vec![self.child(PROGRAM, "steps", 0, doc)?]),
            _ => Err(DecodeError::mismatch(PROGRAM, "steps", "a list of steps or a step object")),
        }
    }

    /// Decode `value` found at `attribute[index]` of a step tagged `owner`.
    fn child(&mut self, owner: &str, attribute: &str, index: usize, value: &Value) -> Result<Step, DecodeError> {
        self.path.push(attribute, index, None);
        let result = self.step(owner, attribute, value).map_err(|e| e.or_path(&self.path));
        self.path.pop();
        result
    }

    fn step(&mut self, owner: &str, attribute: &str, value: &Value) -> Result<Step, DecodeError> {
        let Value::Object(map) = value else {
            return Err(DecodeError::mismatch(owner, attribute, "a list of step objects"));
        };
        let tag = match map.get("type") {
            None | Some(Value::Null) => return Err(DecodeError::malformed(UNTAGGED, "type", "is required")),
            Some(Value::String(tag)) if tag.trim().is_empty() => {
                return Err(DecodeError::malformed(UNTAGGED, "type", "must not be empty"));
            }
            Some(Value::String(tag)) => tag,
            Some(_) => return Err(DecodeError::mismatch(UNTAGGED, "type", "a string")),
        };
        self.path.set_tag(tags::canonical(tag));
        self.step_with_tag(tag, map)
    }

    /// Nested step list at `key`; absent means empty.
    pub(crate) fn body(&mut self, f: &Fields<'_>, key: &str) -> Result<Vec<Step>, DecodeError> {
        match f.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => {
                let attribute = f.attr(key);
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.child(f.tag, &attribute, i, item))
                    .collect()
            }
            Some(_) => Err(DecodeError::mismatch(f.tag, &f.attr(key), "a list of steps")),
        }
    }

    fn opt_body(&mut self, f: &Fields<'_>, key: &str) -> Result<Option<Vec<Step>>, DecodeError> {
        if f.has(key) { self.body(f, key).map(Some) } else { Ok(None) }
    }

    /// `else` / `finally` branches: a step list, or an object carrying `body`.
    fn branch(&mut self, f: &Fields<'_>, key: &str) -> Result<Option<Vec<Step>>, DecodeError> {
        match f.get(key) {
            Some(Value::Object(map)) => {
                let nested = f.nested(f.attr(key), map);
                self.body(&nested, "body").map(Some)
            }
            _ => self.opt_body(f, key),
        }
    }

    /// Decode the attributes of one step as construct `tag`.
    pub(crate) fn step_with_tag(&mut self, tag: &str, map: &Map<String, Value>) -> Result<Step, DecodeError> {
        let Some(id) = tags::from_str(tag) else {
            let attrs = map
                .iter()
                .filter(|(k, _)| k.as_str() != "type")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            return Ok(Step::Custom(CustomStep {
                tag: tag.to_string(),
                attrs,
            }));
        };
        let f = Fields::new(tags::as_str(id), map);

        use ConstructId as C;
        let step = match id {
            C::Shebang => Step::Shebang(f.opt_text("line")?.unwrap_or_else(|| DEFAULT_SHEBANG.to_string())),
            C::Encoding => Step::Encoding(f.opt_text("encoding")?.unwrap_or_else(|| DEFAULT_ENCODING.to_string())),
            C::Import => Step::Import(import(&f)?),
            C::FromImport => Step::FromImport(from_import(&f)?),
            C::FutureImport => Step::FutureImport(f.text_or_list("names")?),
            C::ImportlibImport => Step::ImportlibImport(ImportlibImport {
                module: f.text("module")?,
                alias: f.opt_text("as")?,
            }),
            C::Assign => Step::Assign(AssignStmt {
                targets: f.text_or_list(f.pick(&["target", "targets"]))?,
                value: f.text("value")?,
                type_comment: f.opt_text_any(&["type_comment", "mypy_pragma"])?,
            }),
            C::Annotation => Step::Annotation(AnnAssignStmt {
                target: f.text("target")?,
                annotation: f.text("annotation")?,
                value: f.opt_text("value")?,
            }),
            C::AugAssign => Step::AugAssign(AugAssignStmt {
                target: f.text("target")?,
                op: f.text("op")?,
                value: f.text("value")?,
            }),
            C::Dunder => Step::Dunder(DunderStmt {
                name: f.text("name")?,
                value: f.text("value")?,
            }),
            C::TypeAlias => Step::TypeAlias(TypeAliasStmt {
                name: f.text("name")?,
                type_params: f.text_or_list("type_params")?,
                value: f.text_any(&["expr", "value"])?,
            }),
            C::Expr => Step::Expr(f.text("expr")?),
            C::FuncCall => Step::FuncCall(CallStmt {
                func: f.text("name")?,
                args: f.text_or_list("args")?,
                kwargs: f.pairs("kwargs")?,
                target: f.opt_text("target")?,
            }),
            C::Lambda => Step::Lambda(LambdaStmt {
                params: f.text_or_list("args")?,
                body: f.text("expr")?,
                target: f.opt_text("target")?,
            }),
            C::ListComp | C::SetComp | C::GeneratorExpr => Step::Comprehension(Comprehension {
                kind: match id {
                    C::SetComp => CompKind::Set,
                    C::GeneratorExpr => CompKind::Generator,
                    _ => CompKind::List,
                },
                element: f.text("expr")?,
                var: f.text("var")?,
                iterable: f.text("iterable")?,
                condition: f.opt_text("cond")?,
                target: f.opt_text("target")?,
            }),
            C::DictComp => Step::DictComp(DictComp {
                key: f.text("key")?,
                value: f.text("value")?,
                var: f.text("var")?,
                iterable: f.text("iterable")?,
                condition: f.opt_text("cond")?,
                target: f.opt_text("target")?,
            }),
            C::Walrus => Step::Walrus(WalrusExpr {
                target: f.text("target")?,
                value: f.text("expr")?,
            }),
            C::FStringDebug => Step::FStringDebug(f.text("expr")?),
            C::CondExpr => Step::CondExpr(CondExpr {
                then: f.text("then")?,
                condition: f.text("cond")?,
                orelse: f.text("else")?,
                target: f.opt_text("target")?,
            }),
            C::ChainedComparison => Step::ChainedComparison(ChainedComparison {
                parts: f.text_or_list("comparisons")?,
                target: f.opt_text("target")?,
            }),
            C::Exec | C::Eval => Step::Dynamic(DynamicCode {
                kind: if id == C::Eval { DynamicKind::Eval } else { DynamicKind::Exec },
                source: f.text("expr")?,
                globals: f.opt_text("globals")?,
                locals: f.opt_text("locals")?,
                target: f.opt_text("target")?,
            }),
            C::FuncDef | C::AsyncFuncDef => Step::FunctionDef(FunctionDef {
                is_async: id == C::AsyncFuncDef,
                name: f.text("name")?,
                type_params: f.text_or_list("type_params")?,
                params: parameters(&f)?,
                returns: f.opt_text("returns")?,
                decorators: decorators(&f)?,
                docstring: f.opt_text("docstring")?,
                body: self.body(&f, "body")?,
            }),
            C::ClassDef | C::Dataclass => Step::ClassDef(self.class_def(&f, id == C::Dataclass)?),
            C::If => Step::If(self.if_stmt(&f)?),
            C::For | C::AsyncFor => Step::For(ForStmt {
                is_async: id == C::AsyncFor,
                target: f.text_any(&["var", "target"])?,
                iterable: f.text("iterable")?,
                body: self.body(&f, "body")?,
                orelse: self.branch(&f, "else")?,
            }),
            C::While => Step::While(WhileStmt {
                condition: f.text("condition")?,
                body: self.body(&f, "body")?,
                orelse: self.branch(&f, "else")?,
            }),
            C::Try => Step::Try(self.try_stmt(&f)?),
            C::With | C::AsyncWith => Step::With(WithStmt {
                is_async: id == C::AsyncWith,
                items: f.text_or_list(f.pick(&["contexts", "context", "items"]))?,
                body: self.body(&f, "body")?,
            }),
            C::Match => Step::Match(MatchStmt {
                subject: f.text("subject")?,
                cases: self.body(&f, "cases")?,
            }),
            C::Case => Step::Case(MatchCase {
                pattern: f.text_or_list("pattern")?.join(", "),
                binding: f.opt_text("as")?,
                guard: f.opt_text("guard")?,
                body: self.body(&f, "body")?,
            }),
            C::MainGuard => Step::MainGuard(self.body(&f, "body")?),
            C::Return => Step::Return(f.opt_text("value")?),
            C::Raise => Step::Raise(RaiseStmt {
                exception: f.opt_text("exception")?,
                cause: f.opt_text_any(&["from", "cause"])?,
            }),
            C::Assert => Step::Assert(AssertStmt {
                condition: f.text("condition")?,
                message: f.opt_text_any(&["msg", "message"])?,
            }),
            C::Yield => Step::Yield(f.opt_text("value")?),
            C::YieldFrom => Step::YieldFrom(f.text("expr")?),
            C::Await => Step::Await(AwaitStmt {
                expr: f.text("expr")?,
                target: f.opt_text("target")?,
            }),
            C::Break => Step::Break,
            C::Continue => Step::Continue,
            C::Pass => Step::Pass,
            C::Del => Step::Del(f.text_or_list(f.pick(&["target", "targets"]))?),
            C::Global => Step::Global(f.text_or_list("names")?),
            C::Nonlocal => Step::Nonlocal(f.text_or_list("names")?),
            C::BlankLine => Step::BlankLine(f.count("count", MAX_BLANK_LINES)?.unwrap_or(1)),
            C::Comment => Step::Comment(f.text("text")?),
            C::Docstring => Step::Docstring(f.text("text")?),
            C::MypyPragma => Step::MypyPragma(f.text("pragma")?),
            C::Decorator => Step::Decorator(Decorator {
                name: f.text_any(&["name", "deco"])?,
                args: if f.has("args") { Some(f.text_or_list("args")?) } else { None },
            }),
            C::DecoratorFactory => Step::DecoratorFactory(Decorator {
                name: f.text_any(&["deco", "name"])?,
                args: Some(f.text_or_list("args")?),
            }),
            C::TypeParams => Step::TypeParams(f.text_or_list("params")?),
            C::Elif => Step::Elif(self.if_stmt(&f)?),
            C::Else => Step::Else(self.body(&f, "body")?),
        };
        Ok(step)
    }

    fn class_def(&mut self, f: &Fields<'_>, dataclass: bool) -> Result<ClassDef, DecodeError> {
        let mut keywords = Vec::new();
        if let Some(metaclass) = f.opt_text("metaclass")? {
            keywords.push(("metaclass".to_string(), metaclass));
        }
        keywords.extend(f.pairs("keywords")?);

        let slots_key = f.pick(&["slots", "__slots__"]);
        let slots = if f.has(slots_key) { Some(f.text_or_list(slots_key)?) } else { None };

        let fields = f
            .objects("fields")?
            .iter()
            .map(|field| {
                Ok(FieldDecl {
                    name: field.text("name")?,
                    annotation: field.text_any(&["annotation", "type"])?,
                    default: field.opt_text("default")?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(ClassDef {
            kind: if dataclass {
                ClassKind::Dataclass { args: f.pairs("args")? }
            } else {
                ClassKind::Plain
            },
            name: f.text("name")?,
            type_params: f.text_or_list("type_params")?,
            bases: f.text_or_list("bases")?,
            keywords,
            decorators: decorators(f)?,
            docstring: f.opt_text("docstring")?,
            slots,
            fields,
            body: self.body(f, "body")?,
        })
    }

    fn if_stmt(&mut self, f: &Fields<'_>) -> Result<IfStmt, DecodeError> {
        let mut stmt = IfStmt {
            condition: f.text("condition")?,
            body: self.body(f, "body")?,
            elifs: Vec::new(),
            orelse: None,
        };
        for clause in f.objects("elifs")? {
            stmt.elifs.push(ElifClause {
                condition: clause.text("condition")?,
                body: self.body(&clause, "body")?,
            });
        }
        // Nested form: `elif` is an object that may carry its own `elif` / `else`.
        let mut chained = f.objects("elif")?.into_iter().next();
        let mut chained_else = None;
        while let Some(clause) = chained {
            stmt.elifs.push(ElifClause {
                condition: clause.text("condition")?,
                body: self.body(&clause, "body")?,
            });
            if clause.has("else") {
                chained_else = self.branch(&clause, "else")?;
            }
            chained = clause.objects("elif")?.into_iter().next();
        }
        stmt.orelse = match self.branch(f, "else")? {
            Some(body) => Some(body),
            None => chained_else,
        };
        Ok(stmt)
    }

    fn try_stmt(&mut self, f: &Fields<'_>) -> Result<TryStmt, DecodeError> {
        let body = self.body(f, "body")?;
        let mut handlers = Vec::new();
        for clause in f.objects(f.pick(&["except", "handlers"]))? {
            handlers.push(ExceptHandler {
                exception: clause.opt_text_any(&["exception", "type"])?,
                name: clause.opt_text("as")?,
                body: self.body(&clause, "body")?,
            });
        }
        Ok(TryStmt {
            body,
            handlers,
            orelse: self.branch(f, "else")?,
            finalbody: self.branch(f, "finally")?,
        })
    }
}

// ============================================================================
// Shared shapes
// ============================================================================

fn import_alias(f: &Fields<'_>, key: &str, value: &Value, index: usize) -> Result<ImportAlias, DecodeError> {
    match value {
        Value::Object(map) => {
            let item = f.nested(format!("{}[{}]", f.attr(key), index), map);
            Ok(ImportAlias {
                name: item.text_any(&["name", "module"])?,
                alias: item.opt_text("as")?,
            })
        }
        other => scalar_text(other)
            .map(ImportAlias::new)
            .ok_or_else(|| DecodeError::mismatch(f.tag, &f.attr(key), "a list of names or {name, as} objects")),
    }
}

fn import_aliases(f: &Fields<'_>, key: &str) -> Result<Vec<ImportAlias>, DecodeError> {
    match f.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| import_alias(f, key, item, i))
            .collect(),
        Some(other) => Ok(vec![import_alias(f, key, other, 0)?]),
    }
}

fn import(f: &Fields<'_>) -> Result<ImportStmt, DecodeError> {
    if f.has("modules") {
        return Ok(ImportStmt {
            modules: import_aliases(f, "modules")?,
        });
    }
    Ok(ImportStmt {
        modules: vec![ImportAlias {
            name: f.text("module")?,
            alias: f.opt_text("as")?,
        }],
    })
}

fn from_import(f: &Fields<'_>) -> Result<FromImportStmt, DecodeError> {
    let mut names = import_aliases(f, "names")?;
    if let Some(alias) = f.opt_text("as")? {
        match names.as_mut_slice() {
            [single] => single.alias = Some(alias),
            _ => return Err(DecodeError::malformed(f.tag, "as", "applies to exactly one imported name")),
        }
    }
    let level = f.count("level", MAX_IMPORT_LEVEL)?.unwrap_or(0);
    let module = if level > 0 { f.opt_text("module")?.unwrap_or_default() } else { f.text("module")? };
    Ok(FromImportStmt { module, names, level })
}

fn param(f: &Fields<'_>, key: &str, value: &Value, index: usize) -> Result<Param, DecodeError> {
    match value {
        Value::Object(map) => {
            let item = f.nested(format!("{}[{}]", f.attr(key), index), map);
            Ok(Param {
                name: item.text("name")?,
                annotation: item.opt_text_any(&["annotation", "type"])?,
                default: item.opt_text("default")?,
            })
        }
        Value::String(name) => Ok(Param::new(name.clone())),
        _ => Err(DecodeError::mismatch(f.tag, &f.attr(key), "a parameter name or {name, annotation, default} object")),
    }
}

fn param_list(f: &Fields<'_>, key: &str) -> Result<Vec<Param>, DecodeError> {
    match f.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| param(f, key, item, i))
            .collect(),
        Some(_) => Err(DecodeError::mismatch(f.tag, &f.attr(key), "a list of parameters")),
    }
}

fn opt_param(f: &Fields<'_>, key: &str) -> Result<Option<Param>, DecodeError> {
    f.get(key).map(|value| param(f, key, value, 0)).transpose()
}

fn parameters(f: &Fields<'_>) -> Result<Parameters, DecodeError> {
    let mut params = Parameters {
        positional_only: param_list(f, "positional_only")?,
        args: param_list(f, "args")?,
        vararg: opt_param(f, "vararg")?,
        keyword_only: param_list(f, "keyword_only")?,
        kwarg: opt_param(f, "kwarg")?,
    };

    // `type_hints` / `defaults` maps fill in whatever the parameter entries left unset.
    let hints = f.pairs("type_hints")?;
    let defaults = f.pairs("defaults")?;
    fn lookup(table: &[(String, String)], name: &str) -> Option<String> {
        table.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }
    let all = params
        .positional_only
        .iter_mut()
        .chain(params.args.iter_mut())
        .chain(params.vararg.iter_mut())
        .chain(params.keyword_only.iter_mut())
        .chain(params.kwarg.iter_mut());
    for p in all {
        if p.annotation.is_none() {
            p.annotation = lookup(&hints, &p.name);
        }
        if p.default.is_none() {
            p.default = lookup(&defaults, &p.name);
        }
    }
    Ok(params)
}

fn decorators(f: &Fields<'_>) -> Result<Vec<Decorator>, DecodeError> {
    let Some(value) = f.get("decorators") else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(DecodeError::mismatch(f.tag, "decorators", "a list of decorators"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(name) => Ok(Decorator::new(name.clone())),
            Value::Object(map) => {
                let deco = f.nested(format!("decorators[{}]", i), map);
                let name = deco.text_any(&["name", "deco"])?;
                let args = if deco.has("args") { Some(deco.text_or_list("args")?) } else { None };
                Ok(Decorator { name, args })
            }
            _ => Err(DecodeError::mismatch(f.tag, "decorators", "a list of decorator names or {name, args} objects")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeErrorKind;
    use serde_json::json;

    fn decode(value: Value) -> Step {
        decode_step(&value).expect("decode failed")
    }

    #[test]
    fn test_decode_program_array_preserves_order() {
        let program = decode_program(&json!([
            {"type": "import", "module": "os"},
            {"type": "pass"},
            {"type": "break"},
        ]))
        .unwrap();
        let tags: Vec<_> = program.iter().map(Step::tag).collect();
        assert_eq!(tags, ["import", "pass", "break"]);
    }

    #[test]
    fn test_decode_program_single_object() {
        let program = decode_program(&json!({"type": "pass"})).unwrap();
        assert_eq!(program, vec![Step::Pass]);
    }

    #[test]
    fn test_decode_program_rejects_scalar() {
        let err = decode_program(&json!(42)).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_function_parameters_with_hints_and_defaults() {
        let step = decode(json!({
            "type": "func_def",
            "name": "f",
            "positional_only": ["a"],
            "args": ["b", {"name": "c", "annotation": "int", "default": "0"}],
            "vararg": "args",
            "keyword_only": ["d"],
            "kwarg": "kwargs",
            "type_hints": {"a": "str", "args": "int"},
            "defaults": {"d": "None"},
        }));
        let Step::FunctionDef(func) = step else { panic!("expected function") };
        assert_eq!(func.params.positional_only[0].annotation.as_deref(), Some("str"));
        assert_eq!(func.params.args[1], Param::new("c").annotated("int").with_default("0"));
        assert_eq!(func.params.vararg.as_ref().unwrap().annotation.as_deref(), Some("int"));
        assert_eq!(func.params.keyword_only[0].default.as_deref(), Some("None"));
        assert_eq!(func.params.kwarg.as_ref().unwrap().name, "kwargs");
    }

    #[test]
    fn test_decorator_factory_object() {
        let step = decode(json!({
            "type": "func_def",
            "name": "f",
            "decorators": ["staticmethod", {"deco": "retry", "args": [3, "delay=0.5"]}],
        }));
        let Step::FunctionDef(func) = step else { panic!("expected function") };
        assert_eq!(func.decorators[0], Decorator::new("staticmethod"));
        assert_eq!(
            func.decorators[1],
            Decorator::factory("retry", vec!["3".into(), "delay=0.5".into()])
        );
    }

    #[test]
    fn test_alias_tags_decode_to_canonical_variant() {
        let step = decode(json!({"type": "magic_method", "name": "__len__", "args": ["self"]}));
        assert_eq!(step.tag(), "func_def");

        let step = decode(json!({"type": "multi_with", "contexts": ["a", "b"]}));
        let Step::With(with) = &step else { panic!("expected with") };
        assert_eq!(with.items, ["a", "b"]);

        let step = decode(json!({"type": "raise_from", "exception": "E()", "from": "err"}));
        assert_eq!(
            step,
            Step::Raise(RaiseStmt {
                exception: Some("E()".into()),
                cause: Some("err".into())
            })
        );
    }

    #[test]
    fn test_metaclass_becomes_class_keyword() {
        let step = decode(json!({
            "type": "metaclass_class_def",
            "name": "Model",
            "bases": ["Base"],
            "metaclass": "Meta",
        }));
        let Step::ClassDef(class) = step else { panic!("expected class") };
        assert_eq!(class.keywords, [("metaclass".to_string(), "Meta".to_string())]);
        assert_eq!(class.kind, ClassKind::Plain);
    }

    #[test]
    fn test_dataclass_args_keep_order_and_python_literals() {
        let step = decode(json!({
            "type": "parameterized_dataclass",
            "name": "P",
            "args": {"frozen": true, "order": false, "slots": true},
            "fields": [{"name": "x", "annotation": "int"}],
        }));
        let Step::ClassDef(class) = step else { panic!("expected class") };
        let ClassKind::Dataclass { args } = &class.kind else { panic!("expected dataclass") };
        let rendered: Vec<_> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(rendered, ["frozen=True", "order=False", "slots=True"]);
        assert_eq!(class.fields[0].annotation, "int");
    }

    #[test]
    fn test_nested_elif_chain_is_flattened() {
        let step = decode(json!({
            "type": "if",
            "condition": "a",
            "body": [{"type": "pass"}],
            "elif": {
                "condition": "b",
                "body": [],
                "elif": {"condition": "c", "body": [], "else": [{"type": "break"}]}
            }
        }));
        let Step::If(stmt) = step else { panic!("expected if") };
        let conds: Vec<_> = stmt.elifs.iter().map(|e| e.condition.as_str()).collect();
        assert_eq!(conds, ["b", "c"]);
        assert_eq!(stmt.orelse, Some(vec![Step::Break]));
    }

    #[test]
    fn test_try_accepts_single_except_object() {
        let step = decode(json!({
            "type": "try",
            "body": [{"type": "pass"}],
            "except": {"exception": "ValueError", "as": "e", "body": []},
            "finally": [{"type": "pass"}],
        }));
        let Step::Try(stmt) = step else { panic!("expected try") };
        assert_eq!(stmt.handlers.len(), 1);
        assert_eq!(stmt.handlers[0].name.as_deref(), Some("e"));
        assert_eq!(stmt.finalbody, Some(vec![Step::Pass]));
        assert_eq!(stmt.orelse, None);
    }

    #[test]
    fn test_case_pattern_list_is_joined() {
        let step = decode(json!({"type": "case", "pattern": ["a", "*rest", "b"], "body": []}));
        let Step::Case(case) = step else { panic!("expected case") };
        assert_eq!(case.pattern, "a, *rest, b");
    }

    #[test]
    fn test_unknown_tag_decodes_to_custom_without_type() {
        let step = decode(json!({"type": "unsupported_construct", "x": 1, "y": "z"}));
        let Step::Custom(custom) = step else { panic!("expected custom") };
        assert_eq!(custom.tag, "unsupported_construct");
        let keys: Vec<_> = custom.attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x", "y"]);
    }

    #[test]
    fn test_missing_required_attribute_is_malformed() {
        let err = decode_step(&json!({"type": "func_def", "body": []})).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::MalformedStep {
                tag: "func_def".into(),
                attribute: "name".into(),
                reason: "is required".into(),
            }
        );
    }

    #[test]
    fn test_body_not_a_list_is_type_mismatch() {
        let err = decode_step(&json!({"type": "while", "condition": "x", "body": "pass"})).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::TypeMismatch {
                tag: "while".into(),
                attribute: "body".into(),
                expected: "a list of steps".into(),
            }
        );
    }

    #[test]
    fn test_nested_error_carries_breadcrumb() {
        let err = decode_program(&json!([
            {"type": "pass"},
            {"type": "func_def", "name": "f", "body": [
                {"type": "expr", "expr": "x"},
                {"type": "if", "body": []}
            ]}
        ]))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "steps[1] (func_def) > body[1] (if)");
        assert!(matches!(err.kind, DecodeErrorKind::MalformedStep { ref attribute, .. } if attribute == "condition"));
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let err = decode_step(&json!({"name": "f"})).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::MalformedStep { ref attribute, .. } if attribute == "type"));
    }

    #[test]
    fn test_non_object_body_entry_is_type_mismatch() {
        let err = decode_step(&json!({"type": "main_guard", "body": ["print()"]})).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::TypeMismatch { ref tag, .. } if tag == "main_guard"));
        assert_eq!(err.path.to_string(), "steps[0] (main_guard) > body[0]");
    }

    #[test]
    fn test_nested_clause_attribute_is_scoped() {
        let err = decode_step(&json!({
            "type": "try",
            "body": [],
            "except": [{"body": []}, {"as": "e", "body": 3}]
        }))
        .unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::TypeMismatch { ref attribute, .. } if attribute == "except[1].body"));
    }

    #[test]
    fn test_from_import_alias_requires_single_name() {
        let err = decode_step(&json!({"type": "from_import", "module": "m", "names": ["a", "b"], "as": "c"})).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::MalformedStep { ref attribute, .. } if attribute == "as"));
    }

    #[test]
    fn test_relative_from_import_allows_missing_module() {
        let step = decode(json!({"type": "from_import", "level": 1, "names": ["sibling"]}));
        let Step::FromImport(stmt) = step else { panic!("expected from_import") };
        assert_eq!(stmt.level, 1);
        assert!(stmt.module.is_empty());
    }

    #[test]
    fn test_defaults_for_markers() {
        assert_eq!(decode(json!({"type": "shebang"})), Step::Shebang(DEFAULT_SHEBANG.into()));
        assert_eq!(decode(json!({"type": "encoding"})), Step::Encoding(DEFAULT_ENCODING.into()));
        assert_eq!(decode(json!({"type": "blank_line"})), Step::BlankLine(1));
        assert_eq!(decode(json!({"type": "blank_line", "count": 2})), Step::BlankLine(2));
    }

    #[test]
    fn test_count_beyond_limit_is_malformed() {
        let err = decode_step(&json!({"type": "blank_line", "count": u64::MAX})).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::MalformedStep {
                tag: "blank_line".into(),
                attribute: "count".into(),
                reason: format!("must be at most {}", MAX_BLANK_LINES),
            }
        );
        assert_eq!(
            decode(json!({"type": "blank_line", "count": MAX_BLANK_LINES})),
            Step::BlankLine(MAX_BLANK_LINES)
        );
    }

    #[test]
    fn test_relative_import_level_is_bounded() {
        let doc = json!({"type": "from_import", "level": 1_000_000, "names": ["x"]});
        let err = decode_step(&doc).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::MalformedStep { ref attribute, .. } if attribute == "level"));
    }

    #[test]
    fn test_negative_count_is_type_mismatch() {
        let err = decode_step(&json!({"type": "blank_line", "count": -1})).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_scalar_values_render_as_python() {
        let step = decode(json!({"type": "return", "value": null}));
        assert_eq!(step, Step::Return(None));
        let step = decode(json!({"type": "assign", "target": "flag", "value": false}));
        let Step::Assign(assign) = step else { panic!("expected assign") };
        assert_eq!(assign.value, "False");
    }
}
