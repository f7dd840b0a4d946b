use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::AppResult;
use crate::stress::RunResult;

/// Writes the batch summaries as pretty printed JSON, creating missing parent
/// directories.
pub(crate) async fn export_json(path: &Path, result: &RunResult) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(result)?;
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
