//! File markers and imports.

use pystep_syntax::decode::MAX_IMPORT_LEVEL;
use pystep_syntax::{tags, ImportAlias, Step};

use super::{require, require_all, typed, unexpected};
use crate::context::EmitContext;
use crate::errors::{EmitError, EmitResult};
use crate::lines::Line;

pub(super) fn shebang(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Shebang(line) = step.as_ref() else {
        return Err(unexpected(&step, tags::SHEBANG));
    };
    let line = require(tags::SHEBANG, "line", line)?;
    let text = if line.starts_with("#!") { line.to_string() } else { format!("#!{}", line) };
    Ok(vec![ctx.verbatim(text)])
}

pub(super) fn encoding(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Encoding(encoding) = step.as_ref() else {
        return Err(unexpected(&step, tags::ENCODING));
    };
    let encoding = require(tags::ENCODING, "encoding", encoding)?;
    Ok(vec![ctx.verbatim(format!("# -*- coding: {} -*-", encoding))])
}

fn alias_list(tag: &str, attribute: &str, aliases: &[ImportAlias]) -> EmitResult<String> {
    if aliases.is_empty() {
        return Err(EmitError::malformed(tag, attribute, "must not be empty"));
    }
    let mut parts = Vec::with_capacity(aliases.len());
    for alias in aliases {
        let name = require(tag, attribute, &alias.name)?;
        match alias.alias.as_deref().filter(|a| !a.trim().is_empty()) {
            Some(a) => parts.push(format!("{} as {}", name, a)),
            None => parts.push(name.to_string()),
        }
    }
    Ok(parts.join(", "))
}

pub(super) fn import(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::Import(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::IMPORT));
    };
    let modules = alias_list(tags::IMPORT, "module", &stmt.modules)?;
    Ok(vec![ctx.line(format!("import {}", modules))])
}

pub(super) fn from_import(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::FromImport(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::FROM_IMPORT));
    };
    if stmt.level == 0 {
        require(tags::FROM_IMPORT, "module", &stmt.module)?;
    }
    if stmt.level > MAX_IMPORT_LEVEL {
        return Err(EmitError::malformed(
            tags::FROM_IMPORT,
            "level",
            format!("must be at most {}", MAX_IMPORT_LEVEL),
        ));
    }
    let names = alias_list(tags::FROM_IMPORT, "names", &stmt.names)?;
    let source = format!("{}{}", ".".repeat(stmt.level), stmt.module.trim());
    Ok(vec![ctx.line(format!("from {} import {}", source, names))])
}

pub(super) fn future_import(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::FutureImport(names) = step.as_ref() else {
        return Err(unexpected(&step, tags::FUTURE_IMPORT));
    };
    require_all(tags::FUTURE_IMPORT, "names", names)?;
    Ok(vec![ctx.line(format!("from __future__ import {}", names.join(", ")))])
}

/// `import importlib` followed by the dynamic import binding.
pub(super) fn importlib_import(step: &Step, ctx: &mut EmitContext<'_>) -> EmitResult<Vec<Line>> {
    let step = typed(step, ctx)?;
    let Step::ImportlibImport(stmt) = step.as_ref() else {
        return Err(unexpected(&step, tags::IMPORTLIB_IMPORT));
    };
    let module = require(tags::IMPORTLIB_IMPORT, "module", &stmt.module)?;
    // Without an alias, bind the last dotted segment (`os.path` -> `path`).
    let binding = match stmt.alias.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(alias) => alias,
        None => module.rsplit('.').next().unwrap_or(module),
    };
    Ok(vec![
        ctx.line("import importlib"),
        ctx.line(format!("{} = importlib.import_module('{}')", binding, module)),
    ])
}
