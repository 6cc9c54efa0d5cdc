// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! New command - create, provision and push a SvelteKit project

use colored::Colorize;
use rand::RngCore;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{Boilerplate, CloudFlareConfig, Config, DeploymentTargetConfig, SaasFsConfig};
use crate::errors::{DankuError, DankuResult};
use crate::materializer::{self, templates, workflow, JsonEdit, Patch, TemplateRegistry};
use crate::process::{require_tool, CommandRunner};
use crate::providers::{cloudflare, DeploymentTarget, GitProvider, RepoRef, Scope, TargetSession};
use crate::reconcile::{provision_env_secret, provision_env_variable};
use crate::utils::{create_spinner, print_info, print_success};

const DEV_BASE_URL: &str = "http://localhost:5173";
const MIGRATIONS_DIR: &str = "./src/lib/server/db/migrations";

/// `sv add` add-ons every project starts with
const ADD_ONS: &[&str] = &[
    "devtools-json",
    "eslint",
    "playwright",
    "prettier",
    "tailwindcss=plugins:typography,forms",
    "vitest=usages:unit,component",
];

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid project name regex"))
}

/// Project names end up as a directory, a repository, a worker and a D1
/// database, so they are held to the strictest of those rules.
pub fn validate_project_name(name: &str) -> DankuResult<()> {
    let reason = if name.len() > 63 {
        Some("must be at most 63 characters")
    } else if !project_name_pattern().is_match(name) {
        Some("must start with a lowercase letter or digit")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DankuError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// 32 random bytes, hex encoded
fn generate_auth_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn migrate_script(name: &str) -> String {
    let confirm = if cfg!(windows) { "echo y |" } else { "yes |" };
    format!("{} wrangler d1 migrations apply {} --local", confirm, name)
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct NewProject {
    pub repo: RepoRef,
    pub clone_url: String,
    pub path: PathBuf,
}

/// Drives one `danku new` run against the given providers
pub struct Scaffolder<'a> {
    config: &'a Config,
    git: &'a dyn GitProvider,
    target: &'a dyn DeploymentTarget,
    runner: &'a dyn CommandRunner,
    templates: TemplateRegistry,
    workspace: PathBuf,
}

impl<'a> Scaffolder<'a> {
    /// `workspace` is the directory the project folder is created in
    pub fn new(
        config: &'a Config,
        git: &'a dyn GitProvider,
        target: &'a dyn DeploymentTarget,
        runner: &'a dyn CommandRunner,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            git,
            target,
            runner,
            templates: TemplateRegistry::new(),
            workspace: workspace.into(),
        }
    }

    pub async fn run(&self, name: &str) -> DankuResult<NewProject> {
        validate_project_name(name)?;

        let project_dir = self.workspace.join(name);
        let (repo, session) = self.check_preconditions(name, &project_dir).await?;

        println!(
            "{} Creating a new SvelteKit project \"{}\"",
            "DANKU🧊".bold(),
            name
        );

        print_info(&format!("Creating repository {}", repo));
        let clone_url = self.git.create_repository(&repo).await?;
        tracing::info!("Created repository {}", clone_url);

        self.scaffold(name).await?;
        self.templates.copy(templates::DEFAULT, &project_dir)?;

        match &self.config.boilerplate {
            Some(boilerplate @ Boilerplate::Marketing(_)) => {
                self.apply_marketing(boilerplate, &repo, &session, &project_dir)
                    .await?;
            }
            Some(boilerplate @ Boilerplate::SaasFs(saas)) => {
                self.apply_marketing(boilerplate, &repo, &session, &project_dir)
                    .await?;
                self.apply_saas_fs(saas, &repo, &project_dir, name).await?;
            }
            None => {}
        }

        match &self.config.deployment_target {
            DeploymentTargetConfig::CloudFlare(cf) => {
                self.apply_cloudflare(cf, &repo, &session, &project_dir, name)
                    .await?;
            }
        }

        self.push(&project_dir, &clone_url).await?;

        println!(
            "{} Successfully created SvelteKit project \"{}\"",
            "DANKU✅".bold(),
            name
        );

        Ok(NewProject {
            repo,
            clone_url,
            path: project_dir,
        })
    }

    /// Everything that can refuse the run, checked before anything is created
    async fn check_preconditions(
        &self,
        name: &str,
        project_dir: &Path,
    ) -> DankuResult<(RepoRef, TargetSession)> {
        if project_dir.exists() {
            return Err(DankuError::DirectoryExists {
                path: project_dir.to_path_buf(),
            });
        }

        let spinner = create_spinner("Checking git provider and deployment target...");
        let result = self.check_remote(name).await;
        spinner.finish_and_clear();
        result
    }

    async fn check_remote(&self, name: &str) -> DankuResult<(RepoRef, TargetSession)> {
        tracing::info!("Checking {} for repository {}", self.git.name(), name);
        let repo = self.git.connect(name).await?;
        if self.git.repository_exists(&repo).await? {
            return Err(DankuError::RepositoryExists {
                name: name.to_string(),
            });
        }

        tracing::info!("Checking {} for resource {}", self.target.name(), name);
        let session = self.target.verify().await?;
        if self.target.resource_exists(&session, name).await? {
            return Err(DankuError::ResourceExists {
                name: name.to_string(),
            });
        }

        Ok((repo, session))
    }

    async fn pnpm(&self, args: &[&str], cwd: &Path) -> DankuResult<()> {
        self.runner.run("pnpm", args, cwd).await
    }

    async fn run_git(&self, args: &[&str], cwd: &Path) -> DankuResult<()> {
        self.runner.run("git", args, cwd).await
    }

    /// `sv add` for one add-on, run from the workspace with `--cwd`
    async fn sv_add(&self, add_on: &str, name: &str) -> DankuResult<()> {
        self.pnpm(
            &["dlx", "sv", "add", add_on, "--install", "pnpm", "--cwd", name],
            &self.workspace,
        )
        .await
    }

    async fn scaffold(&self, name: &str) -> DankuResult<()> {
        print_info("Generating the SvelteKit project");
        self.pnpm(
            &[
                "dlx",
                "sv",
                "create",
                "--template",
                "minimal",
                "--types",
                "ts",
                "--no-add-ons",
                "--install",
                "pnpm",
                name,
            ],
            &self.workspace,
        )
        .await?;

        for add_on in ADD_ONS {
            self.sv_add(add_on, name).await?;
        }
        Ok(())
    }

    /// Shared by both boilerplates: base URL, analytics and SEO routes
    async fn apply_marketing(
        &self,
        boilerplate: &Boilerplate,
        repo: &RepoRef,
        session: &TargetSession,
        project_dir: &Path,
    ) -> DankuResult<()> {
        print_info("Adding the marketing boilerplate");

        let origin = self.config.deployment_target.url().origin().ascii_serialization();
        let outcome =
            provision_env_variable(self.git, repo, project_dir, "BASE_URL", DEV_BASE_URL, &origin)
                .await?;
        tracing::info!("BASE_URL variable {}", outcome);

        let post_hog_api_key = boilerplate.post_hog_api_key().unwrap_or_default();
        let outcome =
            provision_env_variable(self.git, repo, project_dir, "POSTHOG_API_KEY", "", post_hog_api_key)
                .await?;
        tracing::info!("POSTHOG_API_KEY variable {}", outcome);

        let proxy = self.target.deploy_reverse_proxy(session).await?;
        tracing::info!("Reverse proxy deployed at {}", proxy);

        self.templates.copy(templates::MARKETING, project_dir)?;

        // The marketing template serves robots.txt from a route instead
        let robots = project_dir.join("static").join("robots.txt");
        match std::fs::remove_file(&robots) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(DankuError::write_error(&robots, e));
            }
            _ => {}
        }

        materializer::patch_file(
            &project_dir.join("src/routes/+layout.ts"),
            &[Patch::replace(
                "apiHost = \"DANKU\";",
                format!("apiHost = \"{}\";", proxy.as_str().trim_end_matches('/')),
            )],
        )?;
        materializer::patch_file(
            &project_dir.join("svelte.config.js"),
            &[Patch::replace(
                "adapter: adapter()",
                "adapter: adapter(),\n   paths: {\n     relative: false\n   }",
            )],
        )?;

        self.pnpm(&["add", "posthog-js"], project_dir).await?;
        print_success("Marketing boilerplate added");
        Ok(())
    }

    async fn apply_saas_fs(
        &self,
        saas: &SaasFsConfig,
        repo: &RepoRef,
        project_dir: &Path,
        name: &str,
    ) -> DankuResult<()> {
        print_info("Adding the SaaS boilerplate");

        let outcome = provision_env_secret(
            self.git,
            repo,
            project_dir,
            "AUTH_SECRET",
            &generate_auth_secret(),
            &generate_auth_secret(),
        )
        .await?;
        tracing::info!("AUTH_SECRET secret {}", outcome);

        let outcome = provision_env_variable(
            self.git,
            repo,
            project_dir,
            "STRIPE_PUBLISHABLE_KEY",
            &saas.stripe_publishable_key_dev,
            &saas.stripe_publishable_key,
        )
        .await?;
        tracing::info!("STRIPE_PUBLISHABLE_KEY variable {}", outcome);

        let outcome = provision_env_secret(
            self.git,
            repo,
            project_dir,
            "STRIPE_SECRET_KEY",
            &saas.stripe_secret_key_dev,
            &saas.stripe_secret_key,
        )
        .await?;
        tracing::info!("STRIPE_SECRET_KEY secret {}", outcome);

        let outcome = provision_env_secret(
            self.git,
            repo,
            project_dir,
            "STRIPE_WEBHOOK_SECRET",
            "",
            &saas.stripe_webhook_secret,
        )
        .await?;
        tracing::info!("STRIPE_WEBHOOK_SECRET secret {}", outcome);

        self.templates.copy(templates::SAAS_FS, project_dir)?;

        materializer::patch_file(
            &project_dir.join("src/app.d.ts"),
            &[
                Patch::replace(
                    "// interface Locals {}",
                    "interface Locals {\n      user?: User;\n    }",
                ),
                Patch::replace(
                    "// interface Platform {}",
                    "interface Platform {\n      env: Env;\n    }",
                ),
                Patch::after(
                    "// for information about these interfaces",
                    "\nimport type { User } from '$lib/server/auth';\n",
                ),
            ],
        )?;

        materializer::modify_json_file(
            &project_dir.join("package.json"),
            &[
                JsonEdit::at("scripts.db:generate", "drizzle-kit generate"),
                JsonEdit::at("scripts.db:migrate", migrate_script(name)),
            ],
        )?;

        self.pnpm(&["add", "-D", "drizzle-kit"], project_dir).await?;
        for package in ["drizzle-orm", "better-auth", "@better-auth/stripe", "stripe", "posthog-node"] {
            self.pnpm(&["add", package], project_dir).await?;
        }
        self.pnpm(&["run", "db:generate"], project_dir).await?;

        print_success("SaaS boilerplate added");
        Ok(())
    }

    async fn apply_cloudflare(
        &self,
        cf: &CloudFlareConfig,
        repo: &RepoRef,
        session: &TargetSession,
        project_dir: &Path,
        name: &str,
    ) -> DankuResult<()> {
        print_info("Configuring Cloudflare Workers deployment");

        let outcome = self
            .git
            .upsert_variable(repo, &Scope::Repository, "CLOUDFLARE_ACCOUNT_ID", &cf.account_id)
            .await?;
        tracing::info!("CLOUDFLARE_ACCOUNT_ID variable {}", outcome);
        let outcome = self
            .git
            .upsert_secret(repo, &Scope::Repository, "CLOUDFLARE_API_TOKEN", &cf.token)
            .await?;
        tracing::info!("CLOUDFLARE_API_TOKEN secret {}", outcome);

        self.templates.copy(templates::CLOUDFLARE, project_dir)?;

        let saas = self.config.saas_fs().is_some();
        workflow::deploy_to_cloudflare(name, self.config.boilerplate.as_ref()).write(project_dir)?;

        self.sv_add("sveltekit-adapter=adapter:cloudflare", name).await?;

        materializer::modify_json_file(
            &project_dir.join("package.json"),
            &[
                JsonEdit::at("scripts.preview", "vite preview && wrangler dev"),
                JsonEdit::at("scripts.cf-typegen", "wrangler types ./src/worker-configuration.d.ts"),
            ],
        )?;
        materializer::modify_json_file(
            &project_dir.join("tsconfig.json"),
            &[JsonEdit::at(
                "compilerOptions.types",
                serde_json::json!(["./src/worker-configuration.d.ts"]),
            )],
        )?;
        materializer::modify_json_file(
            &project_dir.join(".prettierrc"),
            &[JsonEdit::at("singleQuote", false)],
        )?;

        let wrangler = project_dir.join("wrangler.jsonc");
        materializer::modify_json_file(
            &wrangler,
            &[
                JsonEdit::at("name", name),
                JsonEdit::at("compatibility_date", cloudflare::compatibility_date()),
                JsonEdit::at("routes[0].pattern", cf.url.host_str().unwrap_or_default()),
            ],
        )?;

        if saas {
            let database = self.target.ensure_database(session, name).await?;
            tracing::info!("D1 database {} {}", name, database.outcome);

            materializer::modify_json_file(
                &wrangler,
                &[
                    JsonEdit::at("d1_databases[0].binding", "DB"),
                    JsonEdit::at("d1_databases[0].database_name", name),
                    JsonEdit::at("d1_databases[0].database_id", database.value),
                    JsonEdit::at("d1_databases[0].migrations_dir", MIGRATIONS_DIR),
                ],
            )?;
        }

        self.pnpm(&["add", "-D", "wrangler"], project_dir).await?;
        self.pnpm(&["run", "cf-typegen"], project_dir).await?;
        if saas {
            self.pnpm(&["run", "db:migrate"], project_dir).await?;
        }
        self.pnpm(&["run", "format"], project_dir).await?;

        print_success("Cloudflare deployment configured");
        Ok(())
    }

    async fn push(&self, project_dir: &Path, clone_url: &str) -> DankuResult<()> {
        print_info("Pushing the initial commit");

        self.run_git(&["init", "-b", "main"], project_dir).await?;
        self.run_git(&["add", "."], project_dir).await?;
        self.run_git(&["commit", "-m", "Initial commit"], project_dir).await?;
        self.run_git(&["remote", "add", "origin", clone_url], project_dir).await?;
        self.run_git(&["push", "-u", "origin", "main"], project_dir).await?;

        print_success(&format!("Pushed to {}", clone_url));
        Ok(())
    }
}

/// Run the new command
pub async fn run(
    config: &Config,
    git: &dyn GitProvider,
    target: &dyn DeploymentTarget,
    runner: &dyn CommandRunner,
    name: &str,
) -> DankuResult<()> {
    require_tool("pnpm")?;
    require_tool("git")?;

    let workspace = std::env::current_dir()?;
    let project = Scaffolder::new(config, git, target, runner, workspace)
        .run(name)
        .await?;

    println!();
    println!("Next steps:");
    println!("  cd {}", project.path.display());
    println!("  {}", "pnpm dev".cyan());
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GitHubConfig, GitProviderConfig, MarketingConfig};
    use crate::process::{Invocation, RecordingRunner};
    use crate::providers::testing::{FakeGit, FakeTarget, DATABASE_ID, OWNER};
    use tempfile::TempDir;
    use url::Url;

    const APP_D_TS: &str = "// See https://svelte.dev/docs/kit/types#app.d.ts\n// for information about these interfaces\ndeclare global {\n\tnamespace App {\n\t\t// interface Error {}\n\t\t// interface Locals {}\n\t\t// interface PageData {}\n\t\t// interface PageState {}\n\t\t// interface Platform {}\n\t}\n}\n\nexport {};\n";

    fn config(boilerplate: Option<Boilerplate>) -> Config {
        Config {
            boilerplate,
            deployment_target: DeploymentTargetConfig::CloudFlare(CloudFlareConfig {
                account_id: "account-1".into(),
                token: "cf-token".into(),
                url: Url::parse("https://my-cute-website.com").unwrap(),
            }),
            git_provider: GitProviderConfig::GitHub(GitHubConfig {
                token: "gh-token".into(),
            }),
        }
    }

    fn saas() -> Boilerplate {
        Boilerplate::SaasFs(SaasFsConfig {
            stripe_publishable_key: "pk_live".into(),
            stripe_publishable_key_dev: "pk_test".into(),
            stripe_secret_key: "sk_live".into(),
            stripe_secret_key_dev: "sk_test".into(),
            stripe_webhook_secret: "whsec".into(),
            post_hog_api_key: Some("phc_key".into()),
        })
    }

    /// Emulates what `sv create` and `sv add prettier` leave behind
    fn generator(invocation: &Invocation) {
        if !invocation.args.iter().any(|a| a == "create") {
            return;
        }
        let Some(name) = invocation.args.last() else {
            return;
        };
        let dir = invocation.cwd.join(name);
        std::fs::create_dir_all(dir.join("src/routes")).unwrap();
        std::fs::create_dir_all(dir.join("static")).unwrap();
        std::fs::write(
            dir.join("package.json"),
            "{\n    \"name\": \"acme\",\n    \"scripts\": {\n        \"dev\": \"vite dev\"\n    },\n    \"devDependencies\": {\n        \"@sveltejs/kit\": \"^2.0.0\"\n    }\n}\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("tsconfig.json"),
            "{\n    \"extends\": \"./.svelte-kit/tsconfig.json\",\n    \"compilerOptions\": {\n        \"strict\": true\n    }\n}\n",
        )
        .unwrap();
        std::fs::write(dir.join(".prettierrc"), "{\n\t\"useTabs\": true,\n\t\"singleQuote\": true\n}\n").unwrap();
        std::fs::write(
            dir.join("svelte.config.js"),
            "const config = {\n\tkit: {\n\t\tadapter: adapter()\n\t}\n};\n",
        )
        .unwrap();
        std::fs::write(dir.join("src/app.d.ts"), APP_D_TS).unwrap();
        std::fs::write(dir.join("static/robots.txt"), "User-agent: *\n").unwrap();
    }

    #[tokio::test]
    async fn test_existing_directory_makes_no_remote_calls() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("acme")).unwrap();

        let config = config(None);
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::default();

        let err = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap_err();

        assert!(matches!(err, DankuError::DirectoryExists { .. }));
        assert!(git.calls().is_empty());
        assert!(target.calls().is_empty());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_repository_creates_no_local_files() {
        let temp = TempDir::new().unwrap();

        let config = config(None);
        let git = FakeGit::with_repository("acme");
        let target = FakeTarget::default();
        let runner = RecordingRunner::default();

        let err = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap_err();

        assert!(matches!(err, DankuError::RepositoryExists { .. }));
        assert!(!temp.path().join("acme").exists());
        assert!(runner.calls().is_empty());
        assert!(!git.calls().iter().any(|c| c.starts_with("create_repository")));
    }

    #[tokio::test]
    async fn test_existing_deployment_resource_aborts() {
        let temp = TempDir::new().unwrap();

        let config = config(None);
        let git = FakeGit::default();
        let target = FakeTarget::with_resource("acme");
        let runner = RecordingRunner::default();

        let err = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap_err();

        assert!(matches!(err, DankuError::ResourceExists { .. }));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_name_is_rejected_first() {
        let temp = TempDir::new().unwrap();
        let config = config(None);
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::default();

        let err = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("My Project")
            .await
            .unwrap_err();

        assert!(matches!(err, DankuError::InvalidProjectName { .. }));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_plain_project_end_to_end() {
        let temp = TempDir::new().unwrap();

        let config = config(None);
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::with_effect(generator);

        let project = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap();

        assert_eq!(project.clone_url, format!("https://github.com/{}/acme.git", OWNER));

        let wrangler = materializer::read_json(&project.path.join("wrangler.jsonc")).unwrap();
        assert_eq!(wrangler["name"], "acme");
        assert_eq!(wrangler["routes"][0]["pattern"], "my-cute-website.com");
        assert_eq!(wrangler["compatibility_date"], cloudflare::compatibility_date());
        assert!(wrangler.get("d1_databases").is_none());

        let tsconfig = materializer::read_json(&project.path.join("tsconfig.json")).unwrap();
        assert_eq!(tsconfig["compilerOptions"]["types"][0], "./src/worker-configuration.d.ts");
        assert_eq!(tsconfig["compilerOptions"]["strict"], true);

        let prettier = materializer::read_json(&project.path.join(".prettierrc")).unwrap();
        assert_eq!(prettier["singleQuote"], false);

        assert_eq!(git.repo_variable("CLOUDFLARE_ACCOUNT_ID").as_deref(), Some("account-1"));
        assert_eq!(git.repo_secret("CLOUDFLARE_API_TOKEN").as_deref(), Some("cf-token"));
        assert!(project.path.join(workflow::WORKFLOW_PATH).exists());
        assert!(project.path.join(".editorconfig").exists());

        let lines = runner.command_lines();
        assert!(lines[0].starts_with("pnpm dlx sv create --template minimal"));
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("pnpm dlx sv add")).count(),
            ADD_ONS.len() + 1
        );
        assert!(!lines.iter().any(|l| l.contains("db:migrate")));
        assert_eq!(
            &lines[lines.len() - 5..],
            &[
                "git init -b main".to_string(),
                "git add .".to_string(),
                "git commit -m \"Initial commit\"".to_string(),
                format!("git remote add origin https://github.com/{}/acme.git", OWNER),
                "git push -u origin main".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_marketing_project_wires_proxy_and_env() {
        let temp = TempDir::new().unwrap();

        let config = config(Some(Boilerplate::Marketing(MarketingConfig {
            post_hog_api_key: Some("phc_key".into()),
        })));
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::with_effect(generator);

        let project = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap();

        assert_eq!(
            git.variable("Production", "BASE_URL").as_deref(),
            Some("https://my-cute-website.com")
        );
        assert_eq!(git.variable("Production", "POSTHOG_API_KEY").as_deref(), Some("phc_key"));

        let env = std::fs::read_to_string(project.path.join(".env")).unwrap();
        assert!(env.contains("PUBLIC_BASE_URL=http://localhost:5173\n"));
        assert!(env.contains("PUBLIC_POSTHOG_API_KEY=\n"));

        let layout = std::fs::read_to_string(project.path.join("src/routes/+layout.ts")).unwrap();
        assert!(layout.contains("apiHost = \"https://a.my-cute-website.com\";"));

        let svelte_config = std::fs::read_to_string(project.path.join("svelte.config.js")).unwrap();
        assert!(svelte_config.contains("paths: {\n     relative: false\n   }"));

        assert!(!project.path.join("static/robots.txt").exists());
        assert!(runner.command_lines().contains(&"pnpm add posthog-js".to_string()));
        assert!(target.calls().contains(&"deploy_reverse_proxy".to_string()));
    }

    #[tokio::test]
    async fn test_saas_project_provisions_database_and_secrets() {
        let temp = TempDir::new().unwrap();

        let config = config(Some(saas()));
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::with_effect(generator);

        let project = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap();

        assert_eq!(git.secret("Production", "STRIPE_SECRET_KEY").as_deref(), Some("sk_live"));
        assert_eq!(git.secret("Production", "STRIPE_WEBHOOK_SECRET").as_deref(), Some("whsec"));
        assert_eq!(
            git.variable("Production", "STRIPE_PUBLISHABLE_KEY").as_deref(),
            Some("pk_live")
        );

        let prod_secret = git.secret("Production", "AUTH_SECRET").unwrap();
        assert_eq!(prod_secret.len(), 64);

        let env = std::fs::read_to_string(project.path.join(".env")).unwrap();
        assert!(env.contains("STRIPE_SECRET_KEY=sk_test\n"));
        assert!(env.contains("PUBLIC_STRIPE_PUBLISHABLE_KEY=pk_test\n"));
        assert!(env.contains("STRIPE_WEBHOOK_SECRET=\n"));
        let dev_secret = env
            .lines()
            .find_map(|l| l.strip_prefix("AUTH_SECRET="))
            .unwrap();
        assert_eq!(dev_secret.len(), 64);
        assert_ne!(dev_secret, prod_secret);

        let wrangler = materializer::read_json(&project.path.join("wrangler.jsonc")).unwrap();
        let database = &wrangler["d1_databases"][0];
        assert_eq!(database["binding"], "DB");
        assert_eq!(database["database_name"], "acme");
        assert_eq!(database["database_id"], DATABASE_ID);
        assert_eq!(database["migrations_dir"], MIGRATIONS_DIR);
        assert_eq!(target.database("acme").as_deref(), Some(DATABASE_ID));

        let package = materializer::read_json(&project.path.join("package.json")).unwrap();
        assert_eq!(package["scripts"]["db:generate"], "drizzle-kit generate");
        assert_eq!(package["scripts"]["cf-typegen"], "wrangler types ./src/worker-configuration.d.ts");

        let app = std::fs::read_to_string(project.path.join("src/app.d.ts")).unwrap();
        assert!(app.contains("interface Locals {\n      user?: User;\n    }"));
        assert!(app.contains("interface Platform {\n      env: Env;\n    }"));
        assert!(app.contains("// for information about these interfaces\nimport type { User } from '$lib/server/auth';\n"));

        let lines = runner.command_lines();
        let migrate = lines.iter().position(|l| l == "pnpm run db:migrate").unwrap();
        let format = lines.iter().position(|l| l == "pnpm run format").unwrap();
        assert!(migrate < format);
    }

    #[tokio::test]
    async fn test_failed_command_stops_the_run() {
        let temp = TempDir::new().unwrap();

        let config = config(None);
        let git = FakeGit::default();
        let target = FakeTarget::default();
        let runner = RecordingRunner::with_effect(generator).failing_on("sveltekit-adapter");

        let err = Scaffolder::new(&config, &git, &target, &runner, temp.path())
            .run("acme")
            .await
            .unwrap_err();

        assert!(matches!(err, DankuError::CommandFailed { .. }));
        assert!(!runner.command_lines().iter().any(|l| l.starts_with("git ")));
    }

    #[test]
    fn test_project_names() {
        assert!(validate_project_name("acme").is_ok());
        assert!(validate_project_name("acme-2_site").is_ok());
        assert!(validate_project_name("-acme").is_err());
        assert!(validate_project_name("Acme").is_err());
        assert!(validate_project_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_auth_secret_is_hex() {
        let secret = generate_auth_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
