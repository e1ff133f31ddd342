use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("poll_interval_secs は 1 以上を指定してください (指定値: 0)")]
    ZeroPollInterval,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: deployflow.local.yaml, deployflow.yaml, .deployflow.yaml\n\
        - ~/.config/deployflow/config.yaml\n\
        または DEPLOYFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    SettingsFileNotFound,

    #[error(
        "プロジェクトが指定されていません。--project オプション、DEPLOYFLOW_PROJECT 環境変数、\
        または設定ファイルの project で指定してください"
    )]
    ProjectNotSet,

    #[error("環境変数 {name} の値が不正です: {value}")]
    InvalidEnv { name: String, value: String },

    #[error("設定ファイルの解析に失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
