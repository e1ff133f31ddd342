use clap::Args;
use colored::Colorize;
use deployflow_cloud::{
    CancellationToken, DeploymentManager, GcpDeploymentService, Operation, PollConfig,
    ResourceSet,
};
use deployflow_config::Settings;
use std::path::Path;

/// 全コマンド共通のオプション
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// GCP プロジェクト ID
    #[arg(short, long, global = true, env = "DEPLOYFLOW_PROJECT")]
    pub project: Option<String>,

    /// オペレーション状態の確認間隔（秒）
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// 待機のタイムアウト（秒）。未指定なら完了まで待つ
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Deployment Manager API のベース URL
    #[arg(long, global = true, hide = true)]
    pub endpoint: Option<String>,
}

/// 設定ファイル・環境変数・CLI オプションを重ねて設定を決定する
pub fn resolve_settings(args: &GlobalArgs) -> anyhow::Result<Settings> {
    let mut settings = Settings::load()?;
    apply_overrides(&mut settings, args);
    settings.validate()?;
    tracing::debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, args: &GlobalArgs) {
    if let Some(project) = &args.project {
        settings.project = Some(project.clone());
    }
    if let Some(interval) = args.interval {
        settings.poll_interval_secs = interval;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout_secs = Some(timeout);
    }
    if let Some(endpoint) = &args.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
}

/// リソース定義ファイルを読み込む
pub async fn load_resources(file: &Path) -> anyhow::Result<ResourceSet> {
    let resources = ResourceSet::load(file).await.map_err(|e| {
        anyhow::anyhow!("リソース定義 {} を読み込めません: {}", file.display(), e)
    })?;

    if resources.is_empty() {
        return Err(anyhow::anyhow!(
            "リソース定義 {} にリソースがありません",
            file.display()
        ));
    }
    Ok(resources)
}

/// 既定の認証情報でクライアントを組み立てる
///
/// Ctrl-C で待機を中断できるようにキャンセルトークンを紐付ける。
pub async fn build_manager(
    settings: &Settings,
) -> anyhow::Result<DeploymentManager<GcpDeploymentService>> {
    let mut service = GcpDeploymentService::from_default_credentials()
        .await
        .map_err(|e| anyhow::anyhow!("認証に失敗しました: {}", e))?;
    if let Some(endpoint) = &settings.endpoint {
        service = service.with_base_url(endpoint);
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "中断しています...".yellow());
                cancel.cancel();
            }
        }
    });

    Ok(DeploymentManager::new(service)
        .with_poll_config(PollConfig {
            interval: settings.poll_interval(),
            timeout: settings.timeout(),
        })
        .with_cancellation(cancel))
}

/// 完了したオペレーションを表示
pub fn print_operation_done(op: &Operation) {
    println!(
        "{} {} ({})",
        "✓".green(),
        op.operation_type.cyan(),
        op.name.dimmed()
    );
}
