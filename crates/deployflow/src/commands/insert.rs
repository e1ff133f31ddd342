use crate::utils;
use colored::Colorize;
use deployflow_config::Settings;
use std::path::Path;

pub async fn handle(settings: &Settings, name: &str, file: &Path) -> anyhow::Result<()> {
    let project = settings.require_project()?;
    let resources = utils::load_resources(file).await?;

    println!(
        "{} {} ({} リソース) をプロジェクト {} に作成します...",
        "デプロイメント".blue().bold(),
        name.cyan(),
        resources.len(),
        project.cyan()
    );

    let manager = utils::build_manager(settings).await?;
    let op = manager.insert(project, name, &resources.resources).await?;

    utils::print_operation_done(&op);
    println!("{}", format!("✓ デプロイメント {} を作成しました", name).green());
    Ok(())
}
