//! JSON Exporter
//!
//! 選択された行範囲のレコードを、インデント付きのJSON配列に変換します。

use log::info;

use crate::api::ExportSink;
use crate::error::Result;
use crate::normalizer::Record;
use crate::output::{ClipboardText, Download, ExportOutput, JSON_CONTENT_TYPE};
use crate::window::RowWindow;

/// 名前付きのJSON出力単位
///
/// 単一ファイルやアーカイブのエントリとして出力されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub content: String,
    /// 出力したレコード数
    pub rows: usize,
}

impl ExportPayload {
    /// シート単位のファイル名（`{baseName}__{sheetName}.json`）
    pub fn sheet_file_name(base_name: &str, sheet_name: &str) -> String {
        format!("{}__{}.json", base_name, sheet_name)
    }
}

/// JSONエクスポーター
///
/// フィールド順は各レコードのヘッダー順（行キーは末尾）で、
/// 2スペースでインデントされたJSON配列を出力します。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl JsonExporter {
    /// ウィンドウ内のレコードをJSONテキストに変換
    ///
    /// レコード列やウィンドウが空の場合は`[]`を返します。
    pub fn to_json(&self, records: &[Record], window: RowWindow) -> Result<String> {
        let selected = window.slice(records);
        Ok(serde_json::to_string_pretty(selected)?)
    }

    /// ウィンドウ内のレコードを指定の出力先に書き出す
    pub fn export(
        &self,
        records: &[Record],
        window: RowWindow,
        sink: &ExportSink,
    ) -> Result<ExportOutput> {
        Ok(match sink {
            ExportSink::Clipboard => ExportOutput::Clipboard(self.clipboard(records, window)?),
            ExportSink::Download { file_name } => {
                ExportOutput::Download(self.download(records, window, file_name.clone())?)
            }
        })
    }

    /// ウィンドウ内のレコードをクリップボード用テキストにする
    pub fn clipboard(&self, records: &[Record], window: RowWindow) -> Result<ClipboardText> {
        let text = self.to_json(records, window)?;
        info!("prepared {} records for clipboard", window.len());
        Ok(ClipboardText(text))
    }

    /// ウィンドウ内のレコードをJSONファイルにする
    pub fn download(
        &self,
        records: &[Record],
        window: RowWindow,
        file_name: String,
    ) -> Result<Download> {
        let text = self.to_json(records, window)?;
        info!("prepared {} records as {}", window.len(), file_name);
        Ok(Download {
            file_name,
            content_type: JSON_CONTENT_TYPE,
            bytes: text.into_bytes(),
        })
    }

    /// レコード列全体を名前付きペイロードに変換
    pub fn payload(&self, file_name: String, records: &[Record]) -> Result<ExportPayload> {
        let content = serde_json::to_string_pretty(records)?;
        Ok(ExportPayload {
            file_name,
            content,
            rows: records.len(),
        })
    }
}
