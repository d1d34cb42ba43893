use dockyard_core::Project;

/// 読み込んだプロジェクトを YAML で表示
pub fn handle(project: &Project) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(project)?);
    Ok(())
}
