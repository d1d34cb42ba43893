//! モデル定義
//!
//! dockyard が扱うプロジェクトとサービスのデータモデルです。

mod project;
mod service;

// Re-exports
pub use project::*;
pub use service::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn test_project_creation() {
        let mut services = BTreeMap::new();
        services.insert(
            "api".to_string(),
            Service {
                name: "api".to_string(),
                image: Some("myapp:1.0.0".to_string()),
                ..Default::default()
            },
        );

        let project = Project {
            name: "my-project".to_string(),
            working_dir: PathBuf::from("/srv/my-project"),
            services,
        };

        assert_eq!(project.name, "my-project");
        assert_eq!(project.services.len(), 1);
        assert!(project.service("api").is_some());
        assert!(project.service("db").is_none());
    }

    #[test]
    fn test_project_serialization() {
        let mut services = BTreeMap::new();
        services.insert(
            "web".to_string(),
            Service {
                name: "web".to_string(),
                image: None,
                build: Some(BuildConfig {
                    context: PathBuf::from("./web"),
                    ..Default::default()
                }),
            },
        );
        let project = Project {
            name: "demo".to_string(),
            working_dir: PathBuf::from("/tmp/demo"),
            services,
        };

        let yaml = serde_yaml::to_string(&project).unwrap();
        assert!(yaml.contains("name: demo"));
        assert!(yaml.contains("./web"));
    }
}
