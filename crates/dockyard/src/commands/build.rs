use crate::docker;
use colored::Colorize;
use dockyard_build::{
    ArgOverrides, Dispatcher, DockerInventory, DriverRegistry, ImageService, ProgressMode,
};
use dockyard_core::Project;
use std::sync::Arc;

/// `--build-arg` の値を上書きマップに変換
///
/// `KEY=VALUE` はそのまま、`KEY` だけなら環境変数の値を使う（未設定なら無視）。
pub fn parse_build_args(raw: &[String]) -> anyhow::Result<ArgOverrides> {
    let mut overrides = ArgOverrides::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((key, _)) if key.is_empty() => {
                anyhow::bail!("不正なビルド引数です: {}", entry);
            }
            Some((key, value)) => {
                overrides.insert(key.to_string(), value.to_string());
            }
            None => {
                if entry.is_empty() {
                    anyhow::bail!("空のビルド引数は指定できません");
                }
                if let Ok(value) = std::env::var(entry) {
                    overrides.insert(entry.clone(), value);
                }
            }
        }
    }
    Ok(overrides)
}

pub async fn handle(
    project: &Project,
    build_args: &[String],
    progress: ProgressMode,
) -> anyhow::Result<()> {
    let overrides = parse_build_args(build_args)?;

    println!(
        "{} {}",
        "プロジェクト:".bold(),
        project.name.cyan()
    );

    let docker = docker::init_docker_with_error_handling().await?;
    let registry = DriverRegistry::new().with_docker(docker.clone());
    let dispatcher = Dispatcher::new(Arc::new(registry)).with_progress_mode(progress);
    let service = ImageService::new(Arc::new(DockerInventory::new(docker)), dispatcher)
        .with_build_args(overrides);

    let batch = service.ensure_images_exist(project, docker::ctrl_c()).await?;

    if batch.is_empty() {
        println!("{}", "✓ すべてのイメージが揃っています".green());
    } else {
        println!();
        println!(
            "{}",
            format!("✓ {}個のイメージを用意しました", batch.len())
                .green()
                .bold()
        );
        for key in batch.keys() {
            println!("  • {}", key.cyan());
        }
    }

    Ok(())
}
