use crate::utils;
use colored::Colorize;
use deployflow_config::Settings;

pub async fn handle(settings: &Settings, name: &str, yes: bool) -> anyhow::Result<()> {
    let project = settings.require_project()?;

    // 確認（--yesが指定されていない場合）
    if !yes {
        println!(
            "{}",
            format!(
                "警告: デプロイメント {} と管理下のリソースをすべて削除します。",
                name
            )
            .yellow()
        );
        println!("実行するには --yes オプションを指定してください");
        return Ok(());
    }

    println!(
        "{} {} をプロジェクト {} から削除します...",
        "デプロイメント".blue().bold(),
        name.cyan(),
        project.cyan()
    );

    let manager = utils::build_manager(settings).await?;
    let op = manager.delete(project, name).await?;

    utils::print_operation_done(&op);
    println!("{}", format!("✓ デプロイメント {} を削除しました", name).green());
    Ok(())
}
