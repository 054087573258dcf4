//! Output Module
//!
//! レコードのJSON出力、ZIPアーカイブ化、プレビュー表示を提供するモジュール。
//! 出力はすべて値（[`ClipboardText`], [`Download`]）として返され、
//! 実際の保存は呼び出し側が行います。

mod archive;
mod json;
mod preview;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;

pub use archive::{ArchiveBuilder, ArchiveEntrySummary};
pub use json::{ExportPayload, JsonExporter};
pub use preview::PreviewTable;

/// 単一JSONファイルのデフォルト名
pub const DEFAULT_JSON_FILE_NAME: &str = "sheet-data.json";

/// バッチエクスポートのアーカイブ名
pub const DEFAULT_ARCHIVE_NAME: &str = "excel_json_export.zip";

/// JSONファイルのContent-Type
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// ZIPアーカイブのContent-Type
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// クリップボードに配置するテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardText(pub String);

impl ClipboardText {
    /// テキスト
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ダウンロードファイル
///
/// ファイル名・Content-Type・内容を保持します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// 指定したディレクトリにファイルとして保存
    ///
    /// # 戻り値
    ///
    /// * `Ok(PathBuf)` - 保存先のパス
    /// * `Err(XlsxToJsonError::Io)` - 書き込みに失敗した場合
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// エクスポート結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    Clipboard(ClipboardText),
    Download(Download),
}

impl ExportOutput {
    /// JSONテキスト（どちらの出力先でも同一）
    pub fn text(&self) -> &str {
        match self {
            ExportOutput::Clipboard(text) => text.as_str(),
            // JSONの出力は常にUTF-8
            ExportOutput::Download(download) => {
                std::str::from_utf8(&download.bytes).unwrap_or_default()
            }
        }
    }

    /// JSONテキストを取り出す
    pub fn into_text(self) -> String {
        match self {
            ExportOutput::Clipboard(text) => text.0,
            ExportOutput::Download(download) => String::from_utf8(download.bytes)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        }
    }
}
