//! プロジェクトローダー
//!
//! compose ファイルを読み込み、検証して `Project` を生成します。

use crate::compose::ComposeFile;
use crate::error::{ProjectError, Result};
use crate::model::{BuildConfig, Project, Service};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// ファイルからプロジェクトをロード
///
/// 作業ディレクトリはファイルの親ディレクトリになります。
/// プロジェクト名の優先順位: `project_name` 引数 > ファイルの `name` > ディレクトリ名
#[instrument(skip_all, fields(file = %file.display()))]
pub fn load_project(file: &Path, project_name: Option<&str>) -> Result<Project> {
    let content = std::fs::read_to_string(file).map_err(|e| ProjectError::IoError {
        path: file.to_path_buf(),
        message: e.to_string(),
    })?;

    let working_dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };

    parse_project(&content, &working_dir, project_name)
}

/// 文字列からプロジェクトをパース
pub fn parse_project(
    content: &str,
    working_dir: &Path,
    project_name: Option<&str>,
) -> Result<Project> {
    debug!("Parsing compose file");
    let file: ComposeFile = serde_yaml::from_str(content)?;

    if file.services.is_empty() {
        return Err(ProjectError::InvalidConfig(
            "サービスが1つも定義されていません".to_string(),
        ));
    }

    let raw_name = project_name
        .map(str::to_string)
        .or(file.name)
        .or_else(|| {
            working_dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();
    let name = normalize_project_name(&raw_name);
    if name.is_empty() {
        return Err(ProjectError::InvalidConfig(format!(
            "プロジェクト名 '{}' が無効です（英数字、'-'、'_' を含めてください）",
            raw_name
        )));
    }

    let mut services = BTreeMap::new();
    for (service_name, raw) in file.services {
        validate_service_name(&service_name)?;

        let service = Service {
            name: service_name.clone(),
            // 空文字の image は未指定として扱う
            image: raw.image.filter(|image| !image.trim().is_empty()),
            build: raw.build.map(BuildConfig::from),
        };
        services.insert(service_name, service);
    }

    let project = Project {
        name,
        working_dir: working_dir.to_path_buf(),
        services,
    };
    info!(
        project = %project.name,
        services = project.services.len(),
        buildable = project.buildable_count(),
        "Project loaded successfully"
    );

    Ok(project)
}

/// プロジェクト名を正規化
///
/// 小文字化し、英数字・`-`・`_` 以外の文字を取り除きます。
pub fn normalize_project_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// サービス名の検証（コンテナ名の制約に合わせる）
fn validate_service_name(name: &str) -> Result<()> {
    let first = match name.chars().next() {
        Some(c) => c,
        None => {
            return Err(ProjectError::InvalidServiceName {
                name: name.to_string(),
                reason: "空のサービス名".to_string(),
            });
        }
    };

    if !first.is_ascii_alphanumeric() {
        return Err(ProjectError::InvalidServiceName {
            name: name.to_string(),
            reason: "先頭は英数字である必要があります".to_string(),
        });
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '.' && *c != '-')
    {
        return Err(ProjectError::InvalidServiceName {
            name: name.to_string(),
            reason: format!("使用できない文字 '{}'", c),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
services:
  app:
    image: "app:latest"
  worker:
    build:
      context: ./worker
      args:
        RUST_VERSION: "1.85"
"#;

    #[test]
    fn test_parse_project_defaults_name_to_dir() {
        let project = parse_project(SAMPLE, Path::new("/home/dev/My.Shop"), None).unwrap();

        assert_eq!(project.name, "myshop");
        assert_eq!(project.working_dir, PathBuf::from("/home/dev/My.Shop"));
        assert_eq!(project.services.len(), 2);
        assert_eq!(project.services["app"].image.as_deref(), Some("app:latest"));
        assert_eq!(project.services["app"].name, "app");

        let build = project.services["worker"].build.as_ref().unwrap();
        assert_eq!(build.context, PathBuf::from("./worker"));
        assert_eq!(build.args["RUST_VERSION"], Some("1.85".to_string()));
    }

    #[test]
    fn test_project_name_priority() {
        let content = format!("name: from-file\n{}", SAMPLE);

        let from_file = parse_project(&content, Path::new("/srv/dir"), None).unwrap();
        assert_eq!(from_file.name, "from-file");

        let explicit = parse_project(&content, Path::new("/srv/dir"), Some("Cli_Name")).unwrap();
        assert_eq!(explicit.name, "cli_name");
    }

    #[test]
    fn test_empty_image_is_unset() {
        let yaml = r#"
services:
  broken:
    image: ""
"#;
        let project = parse_project(yaml, Path::new("/srv/demo"), None).unwrap();
        assert!(project.services["broken"].image.is_none());
        assert!(!project.services["broken"].is_resolvable());
    }

    #[test]
    fn test_rejects_empty_services() {
        let err = parse_project("services: {}", Path::new("/srv/demo"), None).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_invalid_service_name() {
        let yaml = r#"
services:
  "-bad":
    image: alpine
"#;
        let err = parse_project(yaml, Path::new("/srv/demo"), None).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidServiceName { .. }));

        let yaml = r#"
services:
  "bad name":
    image: alpine
"#;
        let err = parse_project(yaml, Path::new("/srv/demo"), None).unwrap_err();
        assert!(err.to_string().contains("bad name"));
    }

    #[test]
    fn test_rejects_unusable_project_name() {
        let err = parse_project(SAMPLE, Path::new("/srv/demo"), Some("!!!")).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_project_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("compose.yaml");
        fs::write(&file, SAMPLE).unwrap();

        let project = load_project(&file, Some("demo")).unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.working_dir, temp_dir.path());
    }

    #[test]
    fn test_load_project_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = load_project(&temp_dir.path().join("compose.yaml"), None).unwrap_err();
        assert!(matches!(err, ProjectError::IoError { .. }));
    }

    #[test]
    fn test_normalize_project_name() {
        assert_eq!(normalize_project_name("My App"), "myapp");
        assert_eq!(normalize_project_name("shop_v2-beta"), "shop_v2-beta");
        assert_eq!(normalize_project_name("..."), "");
    }
}
