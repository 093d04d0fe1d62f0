//! Conversion between index records and LSP workspace symbols.
//!
//! Search results are reported as [`WorkspaceSymbol`]s with kind
//! `CONSTANT`. Until resolved, a symbol carries only a
//! [`WorkspaceLocation`] (a file URI, no range) plus a `data` payload with
//! the source path and tags address. `workspaceSymbol/resolve` hands the
//! symbol back, the payload is decoded, and the resolver fills in the range.

use std::path::{Path, PathBuf};

use ctagsym_format::TargetAddress;
use lsp_types::{Location, OneOf, Range, SymbolKind, Uri, WorkspaceLocation, WorkspaceSymbol};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::resolver::resolve_or_placeholder;
use crate::types::{Position, SymbolRecord};

/// Characters escaped in the path component of a `file://` URI.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Payload carried in `WorkspaceSymbol::data` between query and resolve.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolData {
    path: PathBuf,
    address: TargetAddress,
}

/// Convert a record into an LSP workspace symbol.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the source path is relative or cannot be
/// expressed as a URI, and [`Error::Serialization`] if the `data` payload
/// cannot be encoded.
pub fn to_workspace_symbol(record: &SymbolRecord) -> Result<WorkspaceSymbol> {
    let uri = path_to_uri(&record.source_path)?;
    let location = match record.location {
        Some(pos) => OneOf::Left(Location::new(uri, Range::new(pos.into(), pos.into()))),
        None => OneOf::Right(WorkspaceLocation { uri }),
    };
    let data = serde_json::to_value(SymbolData {
        path: record.source_path.clone(),
        address: record.address.clone(),
    })?;

    Ok(WorkspaceSymbol {
        name: record.name.clone(),
        kind: SymbolKind::CONSTANT,
        tags: None,
        container_name: (!record.container_name.is_empty()).then(|| record.container_name.clone()),
        location,
        data: Some(data),
    })
}

/// Rebuild the record a workspace symbol was created from.
///
/// Returns `None` when the symbol has no (or a foreign) `data` payload.
#[must_use]
pub fn from_workspace_symbol(symbol: &WorkspaceSymbol) -> Option<SymbolRecord> {
    let data: SymbolData = serde_json::from_value(symbol.data.clone()?).ok()?;
    let mut record = SymbolRecord::new(symbol.name.clone(), data.path, data.address);
    if let OneOf::Left(location) = &symbol.location {
        let start = location.range.start;
        record.location = Some(Position::new(start.line, start.character));
    }
    if let Some(container) = &symbol.container_name {
        record.container_name.clone_from(container);
    }
    Some(record)
}

/// Fill in the location of an unresolved workspace symbol.
///
/// Symbols that already have a range, that carry no payload, or whose target
/// cannot be located are returned unchanged.
#[must_use]
pub fn resolve_workspace_symbol(symbol: WorkspaceSymbol) -> WorkspaceSymbol {
    if matches!(symbol.location, OneOf::Left(_)) {
        return symbol;
    }
    let Some(record) = from_workspace_symbol(&symbol) else {
        warn!(symbol = %symbol.name, "Workspace symbol has no tags payload; cannot resolve");
        return symbol;
    };

    let resolved = resolve_or_placeholder(&record);
    if !resolved.is_resolved() {
        return symbol;
    }
    match to_workspace_symbol(&resolved) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(symbol = %symbol.name, error = %e, "Unable to convert resolved symbol");
            symbol
        }
    }
}

/// Build a `file://` URI for an absolute path.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] for relative or non-UTF-8 paths.
pub fn path_to_uri(path: &Path) -> Result<Uri> {
    if !path.is_absolute() {
        return Err(Error::InvalidPath(format!(
            "expected an absolute path: {}",
            path.display()
        )));
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::InvalidPath(format!("path contains invalid UTF-8: {}", path.display())))?;

    // On Unix: /home/user/file.c -> file:///home/user/file.c
    // On Windows: C:\Users\file.c -> file:///C:/Users/file.c
    #[cfg(windows)]
    let path_str = format!("/{}", path_str.replace('\\', "/"));

    let uri_string = format!("file://{}", utf8_percent_encode(&path_str, PATH_ENCODE_SET));
    uri_string
        .parse()
        .map_err(|e| Error::InvalidPath(format!("invalid URI '{uri_string}': {e}")))
}
