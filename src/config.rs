use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::identity::{MAX_UNITS, SLOT_UNIT};

/// A named, configured backpack shape the factory can instantiate. `rows`
/// counts capacity units; the stamped capacity is `rows * 9`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackpackTemplate {
    pub name: String,
    pub visual_key: String,
    pub rows: u8,
}

impl BackpackTemplate {
    pub fn capacity(&self) -> u16 {
        self.rows as u16 * SLOT_UNIT as u16
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub templates: Vec<BackpackTemplate>,
}

impl TemplateConfig {
    pub fn from_yaml(text: &str) -> Result<Self, String> {
        serde_yaml::from_str(text).map_err(|err| format!("template config parse failed: {}", err))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| format!("template config read failed: {}: {}", path.display(), err))?;
        Self::from_yaml(&text)
    }

    /// Reports every template problem instead of stopping at the first;
    /// the validation binary prints the whole list.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for template in &self.templates {
            if template.name.trim().is_empty() {
                issues.push("template with empty name".to_string());
            }
            if !seen.insert(template.name.clone()) {
                issues.push(format!("duplicate template name '{}'", template.name));
            }
            if template.visual_key.trim().is_empty() {
                issues.push(format!("template '{}' has empty visual key", template.name));
            }
            if template.rows == 0 || template.rows > MAX_UNITS {
                issues.push(format!(
                    "template '{}' has invalid rows {} (must be 1..={})",
                    template.name, template.rows, MAX_UNITS
                ));
            }
        }
        issues
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub templates_path: PathBuf,
    pub log_root: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err("usage: backpack_validate <templates.yaml> [log-root]".to_string());
        }
        let templates_path = Path::new(&args[1]).to_path_buf();
        let log_root = if args.len() > 2 {
            Some(Path::new(&args[2]).to_path_buf())
        } else {
            None
        };
        Ok(Self {
            templates_path,
            log_root,
        })
    }
}
