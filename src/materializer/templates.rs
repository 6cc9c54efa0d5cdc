// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Embedded template trees
//!
//! Template files live under `templates/` in the source tree and are compiled
//! into the binary, so a scaffolding run never depends on files next to the
//! executable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{DankuError, DankuResult};

/// Files every project gets
pub const DEFAULT: &str = "boilerplate/default";
/// Marketing site: SEO routes, PostHog client setup
pub const MARKETING: &str = "boilerplate/marketing";
/// Full-stack SaaS: auth, Stripe, D1 via Drizzle
pub const SAAS_FS: &str = "boilerplate/saasFs";
/// Workers deployment manifest
pub const CLOUDFLARE: &str = "boilerplate/cloudflare";
/// PostHog analytics for an existing project
pub const POSTHOG: &str = "analytics/posthog";

/// Embed `templates/<tree>/<file>` as a [`TemplateFile`]
macro_rules! embed {
    ($tree:literal, $file:literal) => {
        TemplateFile {
            path: $file,
            content: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/templates/",
                $tree,
                "/",
                $file
            )),
        }
    };
}

/// A file in a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateFile {
    /// Target path (relative to project root)
    pub path: &'static str,
    pub content: &'static str,
}

/// Template definition
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub files: Vec<TemplateFile>,
}

/// Result of copying a template
#[derive(Debug, Clone)]
pub struct CopyResult {
    pub template_name: String,
    pub files_written: Vec<PathBuf>,
}

/// Registry of built-in templates
pub struct TemplateRegistry {
    templates: BTreeMap<&'static str, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            templates: BTreeMap::new(),
        };
        registry.register_builtin_templates();
        registry
    }

    fn register_builtin_templates(&mut self) {
        self.register(Template {
            name: DEFAULT,
            description: "Editor settings and a permissive robots.txt",
            files: vec![
                embed!("boilerplate/default", ".editorconfig"),
                embed!("boilerplate/default", "static/robots.txt"),
            ],
        });

        self.register(Template {
            name: MARKETING,
            description: "Sitemap, robots.txt route and PostHog client setup",
            files: vec![
                embed!("boilerplate/marketing", "src/hooks.client.ts"),
                embed!("boilerplate/marketing", "src/routes/+layout.ts"),
                embed!("boilerplate/marketing", "src/routes/robots.txt/+server.ts"),
                embed!("boilerplate/marketing", "src/routes/sitemap.xml/+server.ts"),
            ],
        });

        self.register(Template {
            name: SAAS_FS,
            description: "Authentication, Stripe subscriptions and a D1 schema",
            files: vec![
                embed!("boilerplate/saasFs", "drizzle.config.ts"),
                embed!("boilerplate/saasFs", "src/hooks.server.ts"),
                embed!("boilerplate/saasFs", "src/lib/auth-client.ts"),
                embed!("boilerplate/saasFs", "src/lib/server/auth.ts"),
                embed!("boilerplate/saasFs", "src/lib/server/db/index.ts"),
                embed!("boilerplate/saasFs", "src/lib/server/db/schema.ts"),
            ],
        });

        self.register(Template {
            name: CLOUDFLARE,
            description: "Wrangler configuration for Workers",
            files: vec![embed!("boilerplate/cloudflare", "wrangler.jsonc")],
        });

        self.register(Template {
            name: POSTHOG,
            description: "PostHog initialisation for the root layout",
            files: vec![embed!("analytics/posthog", "src/routes/+layout.ts")],
        });
    }

    fn register(&mut self, template: Template) {
        self.templates.insert(template.name, template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Write every file of `template_name` under `target_dir`, overwriting
    /// files that already exist.
    pub fn copy(&self, template_name: &str, target_dir: &Path) -> DankuResult<CopyResult> {
        let template = self
            .get(template_name)
            .ok_or_else(|| DankuError::TemplateNotFound {
                name: template_name.to_string(),
                help: Some(format!(
                    "Available templates: {}",
                    self.templates.keys().copied().collect::<Vec<_>>().join(", ")
                )),
            })?;

        let mut files_written = Vec::with_capacity(template.files.len());

        for file in &template.files {
            let path = target_dir.join(file.path);

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DankuError::write_error(parent, e))?;
            }

            std::fs::write(&path, file.content).map_err(|e| DankuError::write_error(&path, e))?;
            files_written.push(path);
        }

        tracing::debug!(
            "Copied template {} - {} ({} files) into {}",
            template_name,
            template.description,
            files_written.len(),
            target_dir.display()
        );

        Ok(CopyResult {
            template_name: template_name.to_string(),
            files_written,
        })
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
