//! Template catalog loading.
//!
//! This module provides the [`TemplateLoader`] type for loading salary
//! templates from a directory of YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::catalog::TemplateCatalog;
use super::types::SalaryTemplate;

/// Loads and provides access to a catalog of salary templates.
///
/// # Directory Structure
///
/// Every `*.yaml` file in the directory holds one template:
/// ```text
/// config/templates/
/// ├── standard.yaml
/// ├── metro.yaml
/// └── consultant.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use ctc_breakdown::config::{TemplateCatalog, TemplateLoader};
///
/// let loader = TemplateLoader::load("./config/templates").unwrap();
/// let template = loader.template("standard").unwrap();
/// println!("Basic pay: {}%", template.basic_pay_percent);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateLoader {
    templates: HashMap<String, SalaryTemplate>,
}

impl TemplateLoader {
    /// Loads every template in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `TemplateLoader` on success, or an error if:
    /// - The directory is missing or holds no YAML files
    /// - Any file contains invalid YAML or an invalid template
    /// - Two files declare the same template id
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let dir = path.as_ref();
        let dir_str = dir.display().to_string();

        if !dir.is_dir() {
            return Err(EngineError::TemplatesNotFound { path: dir_str });
        }

        let entries = fs::read_dir(dir).map_err(|_| EngineError::TemplatesNotFound {
            path: dir_str.clone(),
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::TemplatesNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(EngineError::TemplatesNotFound {
                path: format!("{} (no template files found)", dir_str),
            });
        }

        // Directory order is platform dependent.
        files.sort();

        let templates = files
            .iter()
            .map(|file| Self::load_yaml(file))
            .collect::<EngineResult<Vec<_>>>()?;

        let loader = Self::from_templates(templates)?;
        debug!(path = %dir_str, count = loader.len(), "Loaded template catalog");
        Ok(loader)
    }

    /// Builds a catalog from already-parsed templates, validating each.
    pub fn from_templates(templates: Vec<SalaryTemplate>) -> EngineResult<Self> {
        let mut map = HashMap::with_capacity(templates.len());
        for template in templates {
            template.validate()?;
            if map.contains_key(&template.id) {
                return Err(EngineError::DuplicateTemplate {
                    template_id: template.id,
                });
            }
            map.insert(template.id.clone(), template);
        }
        Ok(Self { templates: map })
    }

    /// Loads and parses a single template file.
    fn load_yaml(path: &Path) -> EngineResult<SalaryTemplate> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::TemplatesNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::TemplateParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the number of templates in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the catalog holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns the catalog's template ids in sorted order.
    pub fn template_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl TemplateCatalog for TemplateLoader {
    fn template(&self, id: &str) -> Option<&SalaryTemplate> {
        self.templates.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContributionRate, TemplateKind, EMPLOYER_PF};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn templates_path() -> &'static str {
        "./config/templates"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ctc_breakdown_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_sample_catalog() {
        let result = TemplateLoader::load(templates_path());
        assert!(result.is_ok(), "Failed to load templates: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.template_ids(), vec!["consultant", "metro", "standard"]);
    }

    #[test]
    fn test_standard_template_loaded_correctly() {
        let loader = TemplateLoader::load(templates_path()).unwrap();
        let template = loader.template("standard").unwrap();

        assert_eq!(template.name, "Standard Staff Structure");
        assert_eq!(template.basic_pay_percent, dec("40"));
        assert_eq!(
            template.employer_contribution(EMPLOYER_PF).unwrap().selected_option,
            ContributionRate::Percentage(dec("12"))
        );
    }

    #[test]
    fn test_consultant_template_is_custom() {
        let loader = TemplateLoader::load(templates_path()).unwrap();
        assert_eq!(
            loader.template("consultant").unwrap().kind,
            TemplateKind::Custom
        );
    }

    #[test]
    fn test_unknown_template_returns_none() {
        let loader = TemplateLoader::load(templates_path()).unwrap();
        assert!(loader.template("unknown").is_none());
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match TemplateLoader::load("/nonexistent/path") {
            Err(EngineError::TemplatesNotFound { path }) => {
                assert!(path.contains("/nonexistent/path"));
            }
            other => panic!("Expected TemplatesNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_empty_directory_returns_error() {
        let dir = scratch_dir("empty");
        match TemplateLoader::load(&dir) {
            Err(EngineError::TemplatesNotFound { path }) => {
                assert!(path.contains("no template files found"));
            }
            other => panic!("Expected TemplatesNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_malformed_yaml_returns_parse_error() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("broken.yaml"), "id: [unterminated").unwrap();

        match TemplateLoader::load(&dir) {
            Err(EngineError::TemplateParseError { path, .. }) => {
                assert!(path.ends_with("broken.yaml"));
            }
            other => panic!("Expected TemplateParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = SalaryTemplate::new("same", "First");
        let b = SalaryTemplate::new("same", "Second");

        match TemplateLoader::from_templates(vec![a, b]) {
            Err(EngineError::DuplicateTemplate { template_id }) => {
                assert_eq!(template_id, "same");
            }
            other => panic!("Expected DuplicateTemplate error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_template_rejected_on_load() {
        let dir = scratch_dir("invalid");
        fs::write(
            dir.join("bad.yaml"),
            "id: bad\nname: Bad\nbasic_pay_percent: 140\n",
        )
        .unwrap();

        assert!(matches!(
            TemplateLoader::load(&dir),
            Err(EngineError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_contribution_rate_over_hundred_rejected_on_load() {
        let dir = scratch_dir("rate");
        fs::write(
            dir.join("rate.yaml"),
            "id: rate\nname: Rate\nemployer_contributions:\n  EmployerPF: { selected_option: 150, included_in_ctc: true }\n",
        )
        .unwrap();

        match TemplateLoader::load(&dir) {
            Err(EngineError::InvalidTemplate { template_id, message }) => {
                assert_eq!(template_id, "rate");
                assert!(message.contains("EmployerPF"));
            }
            other => panic!("Expected InvalidTemplate error, got {:?}", other),
        }
    }
}
