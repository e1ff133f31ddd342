pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "DEPLOYFLOW_CONFIG_PATH";
pub const PROJECT_ENV: &str = "DEPLOYFLOW_PROJECT";
pub const POLL_INTERVAL_ENV: &str = "DEPLOYFLOW_POLL_INTERVAL";
pub const TIMEOUT_ENV: &str = "DEPLOYFLOW_TIMEOUT";
pub const ENDPOINT_ENV: &str = "DEPLOYFLOW_ENDPOINT";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// グローバル設定ファイルのパス (~/.config/deployflow/config.yaml)
///
/// 存在確認やディレクトリ作成は行わない
pub fn global_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deployflow").join("config.yaml"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 DEPLOYFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: deployflow.local.yaml, deployflow.yaml, .deployflow.yaml
/// 3. ~/.config/deployflow/config.yaml (グローバル設定)
pub fn find_settings_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    let candidates = ["deployflow.local.yaml", "deployflow.yaml", ".deployflow.yaml"];
    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. グローバル設定ファイル
    if let Some(global_config) = global_settings_path() {
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

/// デプロイ設定
///
/// 優先順位: CLI オプション > 環境変数 > 設定ファイル > デフォルト値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GCP プロジェクト ID
    pub project: Option<String>,

    /// オペレーション状態の確認間隔（秒）
    pub poll_interval_secs: u64,

    /// 待機のタイムアウト（秒）。未指定なら完了まで待つ
    pub timeout_secs: Option<u64>,

    /// Deployment Manager API のベース URL
    pub endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_secs: None,
            endpoint: None,
        }
    }
}

impl Settings {
    /// 設定ファイルを読み込む
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 設定ファイル（見つかれば）と環境変数から設定を組み立てる
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file() {
            Ok(path) => Self::from_file(path)?,
            Err(ConfigError::SettingsFileNotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    /// 環境変数で上書き
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(project) = non_empty_env(PROJECT_ENV) {
            self.project = Some(project);
        }
        if let Some(interval) = non_empty_env(POLL_INTERVAL_ENV) {
            let secs = parse_secs(POLL_INTERVAL_ENV, &interval)?;
            if secs == 0 {
                return Err(ConfigError::InvalidEnv {
                    name: POLL_INTERVAL_ENV.to_string(),
                    value: interval,
                });
            }
            self.poll_interval_secs = secs;
        }
        if let Some(timeout) = non_empty_env(TIMEOUT_ENV) {
            self.timeout_secs = Some(parse_secs(TIMEOUT_ENV, &timeout)?);
        }
        if let Some(endpoint) = non_empty_env(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        Ok(())
    }

    /// 値の整合性を確認（確認間隔 0 は API を絶え間なく叩くため不可）
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// プロジェクト ID（未設定ならエラー）
    pub fn require_project(&self) -> Result<&str> {
        self.project.as_deref().ok_or(ConfigError::ProjectNotSet)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
