// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_TASKS;
use crate::config::SlurmOptions;
use crate::errors::ConfigurationError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A workflow declared in a file.
///
/// Every node runs a shell command, so the whole workflow can be shipped to
/// Slurm without the declaring program.
///
/// # Fields
/// * `executor` - Backend used by `batchflow run` (defaults to local)
/// * `slurm` - Options of the Slurm backend (optional)
/// * `nodes` - Node declarations, in declaration order
///
/// # Example
/// ```yaml
/// executor: slurm
/// slurm:
///   environment: sbi
/// nodes:
///   - name: main
///     command: "mkdir -p data"
///   - name: simulate
///     command: "simulate --block {index}"
///     depends_on: [main]
///     tasks: 10
/// ```
#[derive(Debug, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub executor: ExecutorKind,
    #[serde(default)]
    pub slurm: SlurmOptions,
    pub nodes: Vec<NodeConfig>,
}

/// Which backend consumes the graph.
#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    #[default]
    Local,
    Slurm,
}

/// Configuration for a single node.
///
/// # Fields
/// * `name` - Unique node name, also used for generated file names
/// * `command` - Shell command; `{index}` is replaced by the fan-out index
/// * `depends_on` - Names of upstream nodes
/// * `tasks` - Fan-out count (defaults to 1)
/// * `postconditions` - Readiness predicates
/// * `attributes` - Backend hints; `--` keys become `#SBATCH` directives
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default = "default_tasks")]
    pub tasks: usize,
    #[serde(default)]
    pub postconditions: Vec<PostconditionConfig>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_tasks() -> usize {
    DEFAULT_TASKS
}

/// Declarative postconditions, one single-key map per entry.
///
/// ```yaml
/// postconditions:
///   - exists: data/train/simulations.npy
/// ```
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub enum PostconditionConfig {
    /// Holds once the path exists
    Exists { exists: PathBuf },
}

/// Serialization format of a workflow file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Parse workflow file contents.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<WorkflowConfig, String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Load a workflow from a YAML or TOML file, chosen by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkflowConfig, ConfigurationError> {
    let path = path.as_ref();
    let invalid = |reason: String| ConfigurationError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| invalid("unsupported extension (expected .yaml, .yml or .toml)".into()))?;
    let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    parse_config(&content, format).map_err(invalid)
}

/// Load a workflow file and validate its dependency graph.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<WorkflowConfig, ConfigurationError> {
    let cfg = load_config(path)?;
    crate::config::validate_workflow(&cfg)
        .map_err(|errors| ConfigurationError::ValidationFailed { errors })?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SIMULATE_YAML: &str = r#"
executor: slurm
slurm:
  environment: sbi
  base: /scratch/project
nodes:
  - name: main
    command: "mkdir -p data/train"
    postconditions:
      - exists: data/train/simulations.npy
  - name: simulate_train
    command: "simulate --block {index}"
    depends_on: [main]
    tasks: 100
    attributes:
      "--time": "00:30:00"
  - name: merge_train
    command: "merge data/train"
    depends_on: [simulate_train]
"#;

    #[test]
    fn parse_basic_config() {
        let cfg = parse_config(SIMULATE_YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(cfg.executor, ExecutorKind::Slurm);
        assert_eq!(cfg.nodes.len(), 3);
        assert_eq!(cfg.nodes[1].depends_on, vec!["main"]);
        assert_eq!(cfg.nodes[1].tasks, 100);
        assert_eq!(cfg.nodes[2].tasks, 1);
        assert_eq!(
            cfg.nodes[0].postconditions,
            vec![PostconditionConfig::Exists {
                exists: "data/train/simulations.npy".into()
            }]
        );
        assert_eq!(
            cfg.nodes[1].attributes.get("--time").map(String::as_str),
            Some("00:30:00")
        );
        assert_eq!(cfg.slurm.environment.as_deref(), Some("sbi"));
        assert!(cfg.slurm.prune);
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
[[nodes]]
name = "main"
command = "true"
postconditions = [{ exists = "done.txt" }]

[[nodes]]
name = "child"
command = "echo {index}"
depends_on = ["main"]
tasks = 4
"#;
        let cfg = parse_config(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.executor, ExecutorKind::Local);
        assert_eq!(cfg.nodes[1].tasks, 4);
        assert_eq!(
            cfg.nodes[0].postconditions,
            vec![PostconditionConfig::Exists {
                exists: "done.txt".into()
            }]
        );
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("w.yaml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("w.yml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("w.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("w.json")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("workflow")), None);
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workflow.yaml");
        std::fs::write(&path, SIMULATE_YAML).unwrap();

        let cfg = load_and_validate_config(&path).unwrap();
        assert_eq!(cfg.nodes.len(), 3);
    }

    #[test]
    fn test_load_demo_workflow() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/simulate.yaml");
        let cfg = load_and_validate_config(&path).unwrap();

        assert_eq!(cfg.nodes.len(), 5);
        assert_eq!(
            cfg.nodes[0].postconditions,
            vec![
                PostconditionConfig::Exists {
                    exists: "data/train/simulations.csv".into()
                },
                PostconditionConfig::Exists {
                    exists: "data/test/simulations.csv".into()
                },
            ]
        );
        assert_eq!(cfg.nodes[1].tasks, 100);
    }

    #[test]
    fn test_unknown_postcondition_kind_is_rejected() {
        let yaml = r#"
nodes:
  - name: a
    command: "true"
    postconditions:
      - modified_after: data/x
"#;
        assert!(parse_config(yaml, ConfigFormat::Yaml).is_err());
    }

    #[test]
    fn test_load_and_validate_cyclic_config() {
        let yaml = r#"
nodes:
  - name: a
    command: "true"
    depends_on: [b]
  - name: b
    command: "true"
    depends_on: [a]
"#;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cyclic.yaml");
        std::fs::write(&path, yaml).unwrap();

        let error_msg = load_and_validate_config(&path).unwrap_err().to_string();
        assert!(error_msg.contains("Cyclic dependency detected"));
    }

    #[test]
    fn test_load_and_validate_unresolved_dependency() {
        let yaml = r#"
nodes:
  - name: merge
    command: "true"
    depends_on: [nonexistent]
"#;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unresolved.yml");
        std::fs::write(&path, yaml).unwrap();

        let error_msg = load_and_validate_config(&path).unwrap_err().to_string();
        assert!(error_msg.contains("depends on 'nonexistent' which does not exist"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_config("workflow.json").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidConfig { .. }));
        assert!(err.to_string().contains("unsupported extension"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidConfig { .. }));
    }
}
