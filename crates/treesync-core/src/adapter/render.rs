//! Template rendering seam
//!
//! Rendering is a pure function from a template file and a context to bytes.
//! [`VarsRenderer`] only substitutes `{{ name }}` placeholders; anything
//! richer plugs in through [`TemplateRenderer`].

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use super::TemplateContext;
use crate::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Renders a template file given a context
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &Path, context: &TemplateContext) -> Result<Vec<u8>>;
}

/// Substitutes `{{ name }}` with the context value of `name`.
///
/// Strings are inserted verbatim, other values as JSON. An undefined name
/// is a render error.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarsRenderer;

impl VarsRenderer {
    pub fn render_str(&self, source: &str, context: &TemplateContext) -> std::result::Result<String, String> {
        let mut undefined = None;
        let rendered = PLACEHOLDER.replace_all(source, |caps: &Captures<'_>| {
            let name = &caps[1];
            match context.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => {
                    undefined.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });
        match undefined {
            Some(name) => Err(format!("'{}' is undefined", name)),
            None => Ok(rendered.into_owned()),
        }
    }
}

impl TemplateRenderer for VarsRenderer {
    fn render(&self, template: &Path, context: &TemplateContext) -> Result<Vec<u8>> {
        let source = fs::read_to_string(template).map_err(|e| Error::Render {
            template: template.to_path_buf(),
            message: e.to_string(),
        })?;
        self.render_str(&source, context)
            .map(String::into_bytes)
            .map_err(|message| Error::Render {
                template: template.to_path_buf(),
                message,
            })
    }
}
