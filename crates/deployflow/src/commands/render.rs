use crate::utils;
use std::path::Path;

/// 正規化した構成ファイルを stdout に出力
pub async fn handle(file: &Path) -> anyhow::Result<()> {
    let resources = utils::load_resources(file).await?;
    print!("{}", resources.to_document()?);
    Ok(())
}
