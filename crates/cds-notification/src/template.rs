//! `{placeholder}` rendering of notification subjects and bodies.

use thiserror::Error;

use cds_core::error::{AppError, ErrorKind};
use cds_entity::build::BuildContext;

/// Malformed placeholder syntax.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// `{` without a matching `}` (or a `{` nested inside a placeholder).
    #[error("unclosed placeholder starting at byte {position}")]
    Unclosed { position: usize, partial: String },
    /// `}` without a preceding `{`.
    #[error("unexpected '}}' at byte {position}")]
    UnexpectedClose { position: usize, partial: String },
}

impl TemplateError {
    /// Best-effort render: known placeholders resolved, stray delimiters kept.
    pub fn partial(&self) -> &str {
        match self {
            Self::Unclosed { partial, .. } | Self::UnexpectedClose { partial, .. } => partial,
        }
    }

    pub fn into_partial(self) -> String {
        match self {
            Self::Unclosed { partial, .. } | Self::UnexpectedClose { partial, .. } => partial,
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::with_source(ErrorKind::Template, err.to_string(), err)
    }
}

/// Values substituted into templates for one build.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    project: String,
    application: String,
    pipeline: String,
    environment: String,
    status: String,
    build_number: String,
    build_url: String,
}

impl TemplateContext {
    pub fn new(context: &BuildContext, base_url: &str) -> Self {
        Self {
            project: context.project.clone(),
            application: context.application.clone(),
            pipeline: context.pipeline.clone(),
            environment: context.environment.clone(),
            status: context.status.to_string(),
            build_number: context.build_number.to_string(),
            build_url: context.build_url(base_url),
        }
    }

    /// Value of a placeholder, `None` outside the vocabulary.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "project" => &self.project,
            "application" => &self.application,
            "pipeline" => &self.pipeline,
            "environment" => &self.environment,
            "status" => &self.status,
            "buildNumber" => &self.build_number,
            "buildURL" => &self.build_url,
            _ => return None,
        };
        Some(value)
    }
}

/// Render `text`, failing on unbalanced delimiters.
///
/// Unknown placeholder names render as empty text.
pub fn render(text: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut first_error: Option<(usize, bool)> = None;
    let mut open: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(i),
            ('{', Some(start)) => {
                first_error.get_or_insert((start, true));
                out.push_str(&text[start..i]);
                open = Some(i);
            }
            ('}', Some(start)) => {
                let name = text[start + 1..i].trim();
                out.push_str(ctx.get(name).unwrap_or_default());
                open = None;
            }
            ('}', None) => {
                first_error.get_or_insert((i, false));
                out.push('}');
            }
            (c, None) => out.push(c),
            (_, Some(_)) => {}
        }
    }
    if let Some(start) = open {
        first_error.get_or_insert((start, true));
        out.push_str(&text[start..]);
    }

    match first_error {
        None => Ok(out),
        Some((position, true)) => Err(TemplateError::Unclosed {
            position,
            partial: out,
        }),
        Some((position, false)) => Err(TemplateError::UnexpectedClose {
            position,
            partial: out,
        }),
    }
}

/// Render `text`, degrading to the partial render on malformed syntax.
pub fn render_lossy(text: &str, ctx: &TemplateContext) -> String {
    render(text, ctx).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Malformed notification template, using partial render");
        err.into_partial()
    })
}
