mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployflow")]
#[command(about = "宣言したリソースを Deployment Manager へ。完了まで見届ける。", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: utils::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// デプロイメントを作成
    Insert {
        /// デプロイメント名
        name: String,
        /// リソース定義ファイル (.yaml / .yml / .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// デプロイメントの構成を更新
    Update {
        /// デプロイメント名
        name: String,
        /// リソース定義ファイル (.yaml / .yml / .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// デプロイメントを削除
    Delete {
        /// デプロイメント名
        name: String,
        /// 確認なしで削除する
        #[arg(short, long)]
        yes: bool,
    },
    /// 送信される構成ファイルを表示（API は呼ばない）
    Render {
        /// リソース定義ファイル (.yaml / .yml / .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は render の出力に使う）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        // Version / Render は設定・認証不要
        Commands::Version => {
            println!("deployflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Render { file } => {
            commands::render::handle(&file).await?;
        }
        Commands::Insert { name, file } => {
            let settings = utils::resolve_settings(&cli.global)?;
            commands::insert::handle(&settings, &name, &file).await?;
        }
        Commands::Update { name, file } => {
            let settings = utils::resolve_settings(&cli.global)?;
            commands::update::handle(&settings, &name, &file).await?;
        }
        Commands::Delete { name, yes } => {
            let settings = utils::resolve_settings(&cli.global)?;
            commands::delete::handle(&settings, &name, yes).await?;
        }
    }

    Ok(())
}
