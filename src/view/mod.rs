//! View rendering
//!
//! Server-side HTML rendering using Tera. Templates are embedded into
//! the binary at compile time so the deployed artifact is a single
//! executable.

use anyhow::Result;
use rust_embed::RustEmbed;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

/// Embedded page templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct Templates;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Template error: {0}")]
    TemplateError(String),
}

/// Tera wrapper over the embedded template set
#[derive(Clone)]
pub struct ViewEngine {
    tera: Tera,
}

impl ViewEngine {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Collect all templates first
        let mut templates: Vec<(String, String)> = Vec::new();
        for name in Templates::iter() {
            let file = Templates::get(&name).ok_or_else(|| {
                ViewError::TemplateError(format!("Missing embedded template: {}", name))
            })?;
            let content = String::from_utf8(file.data.into_owned()).map_err(|e| {
                ViewError::TemplateError(format!("Template {} is not UTF-8: {}", name, e))
            })?;
            templates.push((name.to_string(), content));
        }

        // Sort templates so base templates are loaded first
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html" || a.0.ends_with("/base.html");
            let b_is_base = b.0 == "base.html" || b.0.ends_with("/base.html");
            b_is_base.cmp(&a_is_base)
        });

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                ViewError::TemplateError(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        // Build inheritance chains after adding all templates
        tera.build_inheritance_chains().map_err(|e| {
            ViewError::TemplateError(format!("Failed to build template inheritance: {}", e))
        })?;

        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| ViewError::TemplateError(format!("Failed to render {}: {}", template, e)).into())
    }
}
