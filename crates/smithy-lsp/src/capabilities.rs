//! Builds the `ServerCapabilities` advertised on `initialize` (§6).
//!
//! The set is fixed rather than build-flag-gated — every capability named
//! in §6 is always advertised — but capabilities are still assembled with
//! the same typed, `ServerCapabilities::default()`-plus-field-assignment
//! style the rest of the LSP ecosystem in this codebase uses, rather than
//! hand-written JSON.

use lsp_types::{
    CodeActionKind, CodeActionOptions, CodeActionProviderCapability, CompletionOptions,
    DiagnosticOptions, DiagnosticServerCapabilities, FileOperationFilter, FileOperationPattern,
    FileOperationPatternKind, FileOperationRegistrationOptions, HoverProviderCapability, OneOf,
    ServerCapabilities, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    WorkDoneProgressOptions, WorkspaceFileOperationsServerCapabilities, WorkspaceServerCapabilities,
    WorkspaceSymbolOptions,
};

/// The four characters that can usefully open a completion session in a
/// Smithy document: a trait (`@`), a control/metadata key (`$`), a
/// namespace/shape-id separator (`.`), or a member separator (`#`).
const COMPLETION_TRIGGER_CHARACTERS: &[&str] = &["@", "$", ".", "#"];

pub fn server_capabilities() -> ServerCapabilities {
    let mut caps = ServerCapabilities::default();

    caps.text_document_sync = Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
        open_close: Some(true),
        change: Some(TextDocumentSyncKind::INCREMENTAL),
        will_save: None,
        will_save_wait_until: None,
        save: None,
    }));

    caps.completion_provider = Some(CompletionOptions {
        resolve_provider: Some(false),
        trigger_characters: Some(
            COMPLETION_TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
        ),
        all_commit_characters: None,
        work_done_progress_options: WorkDoneProgressOptions::default(),
        completion_item: None,
    });

    caps.hover_provider = Some(HoverProviderCapability::Simple(true));
    caps.definition_provider = Some(OneOf::Left(true));
    caps.references_provider = Some(OneOf::Left(true));
    caps.document_symbol_provider = Some(OneOf::Left(true));
    caps.workspace_symbol_provider = Some(OneOf::Right(WorkspaceSymbolOptions {
        resolve_provider: Some(false),
        work_done_progress_options: WorkDoneProgressOptions::default(),
    }));
    caps.document_formatting_provider = Some(OneOf::Left(true));

    caps.code_action_provider = Some(CodeActionProviderCapability::Options(CodeActionOptions {
        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
        resolve_provider: Some(false),
        work_done_progress_options: WorkDoneProgressOptions::default(),
    }));

    caps.diagnostic_provider = Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
        inter_file_dependencies: true,
        workspace_diagnostics: false,
        work_done_progress_options: WorkDoneProgressOptions::default(),
        identifier: Some("smithy-lsp".to_string()),
    }));

    caps.workspace = Some(WorkspaceServerCapabilities {
        workspace_folders: None,
        file_operations: Some(watched_file_operations()),
    });

    caps
}

/// Filters for `.smithy` sources and the two build config files — the set
/// whose creation, deletion, or rename should trigger a watched-file
/// rebuild (§4.7 `watched`, §6 "workspace.fileOperations").
fn watched_file_operations() -> WorkspaceFileOperationsServerCapabilities {
    let filters = vec![
        FileOperationFilter {
            scheme: Some("file".to_string()),
            pattern: FileOperationPattern {
                glob: "**/*.smithy".to_string(),
                matches: Some(FileOperationPatternKind::File),
                options: None,
            },
        },
        FileOperationFilter {
            scheme: Some("file".to_string()),
            pattern: FileOperationPattern {
                glob: format!("**/{}", smithy_lsp_build::SMITHY_BUILD_FILE),
                matches: Some(FileOperationPatternKind::File),
                options: None,
            },
        },
        FileOperationFilter {
            scheme: Some("file".to_string()),
            pattern: FileOperationPattern {
                glob: format!("**/{}", smithy_lsp_build::SMITHY_PROJECT_FILE),
                matches: Some(FileOperationPatternKind::File),
                options: None,
            },
        },
    ];

    WorkspaceFileOperationsServerCapabilities {
        did_create: Some(FileOperationRegistrationOptions { filters: filters.clone() }),
        did_delete: Some(FileOperationRegistrationOptions { filters: filters.clone() }),
        did_rename: Some(FileOperationRegistrationOptions { filters }),
        will_create: None,
        will_delete: None,
        will_rename: None,
    }
}
