use crate::docker;
use colored::Colorize;
use dockyard_build::{DockerInventory, ImageAction, image_name, resolve};
use dockyard_core::Project;

pub async fn handle(project: &Project) -> anyhow::Result<()> {
    let docker = docker::init_docker_with_error_handling().await?;
    let inventory = DockerInventory::new(docker);

    let resolutions = resolve(project, &inventory).await?;

    println!("{} {}", "プロジェクト:".bold(), project.name.cyan());
    for resolution in &resolutions {
        let Some(service) = project.service(&resolution.service) else {
            continue;
        };
        let label = match resolution.action {
            ImageAction::Skip => "skip ".dimmed(),
            ImageAction::Pull => "pull ".yellow(),
            ImageAction::Build => "build".blue(),
        };
        println!(
            "  {} {} ({})",
            label,
            resolution.service.cyan(),
            image_name(project, service)
        );
    }

    Ok(())
}
