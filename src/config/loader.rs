// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Locating, bootstrapping and reading the configuration file

use directories::BaseDirs;
use jsonc_parser::ParseOptions;
use std::path::{Path, PathBuf};

use super::Config;
use crate::errors::{DankuError, DankuResult};

/// Commented template written on first run
pub const DEFAULT_CONFIG: &str = r#"{
  // Configuration file for DANKU CLI
  // Exactly one deployment target and one git provider must be enabled.
  // At most one boilerplate may be enabled.

  "boilerplate": {
    // "marketing": {
    //   "postHogApiKey": ""
    // }
    // "saasFs": {
    //   "stripePublishableKey": "",
    //   "stripePublishableKeyDev": "",
    //   "stripeSecretKey": "",
    //   "stripeSecretKeyDev": "",
    //   "stripeWebhookSecret": "",
    //   "postHogApiKey": ""
    // }
  },

  "deploymentTarget": {
    // "cloudFlare": {
    //   "accountId": "",
    //   "token": "",
    //   "url": ""
    // }
  },

  "gitProvider": {
    // "gitHub": {
    //   "token": ""
    // }
  }
}
"#;

/// `~/.danku/cli/node/config.jsonc`
pub fn default_config_path() -> DankuResult<PathBuf> {
    let base = BaseDirs::new().ok_or(DankuError::NoHomeDirectory)?;
    Ok(base
        .home_dir()
        .join(".danku")
        .join("cli")
        .join("node")
        .join("config.jsonc"))
}

/// Write the commented default configuration, readable only by the owner
pub fn write_default(path: &Path, force: bool) -> DankuResult<()> {
    if path.exists() && !force {
        return Err(DankuError::ConfigExists {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DankuError::write_error(parent, e))?;
    }

    std::fs::write(path, DEFAULT_CONFIG).map_err(|e| DankuError::write_error(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| DankuError::write_error(path, e))?;
    }

    tracing::debug!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Load the configuration, bootstrapping it when missing.
///
/// A missing file is written from [`DEFAULT_CONFIG`] and reported as
/// [`DankuError::ConfigCreated`] so the caller stops and lets the user
/// fill it in.
pub fn load(path: &Path) -> DankuResult<Config> {
    if !path.exists() {
        write_default(path, false)?;
        return Err(DankuError::ConfigCreated {
            path: path.to_path_buf(),
        });
    }

    load_from(path)
}

/// Read and validate an existing configuration file
pub fn load_from(path: &Path) -> DankuResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| DankuError::read_error(path, e))?;
    tracing::debug!("Loaded configuration from {}", path.display());

    let syntax = |message: String| DankuError::ConfigSyntax {
        message: format!("{}: {}", path.display(), message),
        help: Some(
            "Comments and trailing commas are allowed, everything else must be valid JSON".into(),
        ),
    };
    let value = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
        .map_err(|e| syntax(e.to_string()))?
        .ok_or_else(|| syntax("the file is empty".into()))?;

    Config::from_value(&value).map_err(|errors| DankuError::ConfigInvalid { errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Boilerplate;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_parses_but_is_invalid() {
        let value = jsonc_parser::parse_to_serde_value(DEFAULT_CONFIG, &ParseOptions::default())
            .unwrap()
            .unwrap();
        let errors = Config::from_value(&value).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_missing_file_is_bootstrapped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.jsonc");

        let err = load(&path).unwrap_err();
        assert!(matches!(err, DankuError::ConfigCreated { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        // Second run reads the untouched template and fails validation
        let err = load(&path).unwrap_err();
        assert!(matches!(err, DankuError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_write_default_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        assert!(matches!(
            write_default(&path, false),
            Err(DankuError::ConfigExists { .. })
        ));
        write_default(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_load_valid_file_with_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(
            &path,
            r#"{
  // marketing site
  "boilerplate": { "marketing": {} },
  "deploymentTarget": {
    "cloudFlare": { "accountId": "a", "token": "t", "url": "https://example.com", },
  },
  "gitProvider": { "gitHub": { "token": "g" } },
}"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert!(matches!(config.boilerplate, Some(Boilerplate::Marketing(_))));
    }

    #[test]
    fn test_syntax_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(&path, "{ \"boilerplate\": }").unwrap();

        assert!(matches!(
            load(&path),
            Err(DankuError::ConfigSyntax { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_a_syntax_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.jsonc");
        std::fs::write(&path, "  // nothing here\n").unwrap();

        match load(&path) {
            Err(DankuError::ConfigSyntax { message, .. }) => assert!(message.contains("empty")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
