//! Archive Builder
//!
//! 複数のJSONペイロードを1つのZIPアーカイブにまとめます。
//! エントリは追加された順に書き込まれ、`finish()`でダウンロードファイルになります。

use std::collections::HashSet;
use std::io::{Cursor, Write};

use log::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, XlsxToJsonError};
use crate::output::{Download, ExportPayload, ZIP_CONTENT_TYPE};
use crate::security::validate_zip_path;

/// アーカイブに書き込まれたエントリの概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntrySummary {
    pub file_name: String,
    pub rows: usize,
}

/// アーカイブビルダー
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{ArchiveBuilder, ExportPayload};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let mut builder = ArchiveBuilder::new("excel_json_export.zip");
/// builder.add(ExportPayload {
///     file_name: ExportPayload::sheet_file_name("report", "Sheet1"),
///     content: "[]".to_string(),
///     rows: 0,
/// })?;
/// let download = builder.finish()?;
/// assert_eq!(download.file_name, "excel_json_export.zip");
/// # Ok(())
/// # }
/// ```
pub struct ArchiveBuilder {
    archive_name: String,
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntrySummary>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    /// アーカイブ名を指定して生成
    pub fn new(archive_name: impl Into<String>) -> Self {
        Self {
            archive_name: archive_name.into(),
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// ペイロードをエントリとして追加
    ///
    /// 同名のエントリが既に存在する場合は、拡張子の前に ` (2)`, ` (3)`, ... を付与します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 実際に書き込まれたエントリ名
    /// * `Err(XlsxToJsonError::SecurityViolation)` - エントリ名が安全でない場合
    pub fn add(&mut self, payload: ExportPayload) -> Result<String> {
        validate_zip_path(&payload.file_name).map_err(XlsxToJsonError::SecurityViolation)?;

        let name = self.unique_name(&payload.file_name);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer.start_file(name.clone(), options)?;
        self.writer.write_all(payload.content.as_bytes())?;

        self.names.insert(name.clone());
        self.entries.push(ArchiveEntrySummary {
            file_name: name.clone(),
            rows: payload.rows,
        });
        Ok(name)
    }

    /// 追加済みのエントリ
    pub fn entries(&self) -> &[ArchiveEntrySummary] {
        &self.entries
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// エントリが1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// アーカイブを確定してダウンロードファイルを生成
    pub fn finish(self) -> Result<Download> {
        let mut writer = self.writer;
        let bytes = writer.finish()?.into_inner();

        info!(
            "built archive {} with {} entries ({} bytes)",
            self.archive_name,
            self.entries.len(),
            bytes.len()
        );

        Ok(Download {
            file_name: self.archive_name,
            content_type: ZIP_CONTENT_TYPE,
            bytes,
        })
    }

    /// 重複しないエントリ名を決定
    fn unique_name(&self, file_name: &str) -> String {
        if !self.names.contains(file_name) {
            return file_name.to_string();
        }

        let (stem, ext) = match file_name.rfind('.') {
            Some(pos) if pos > 0 => file_name.split_at(pos),
            _ => (file_name, ""),
        };
        (2..)
            .map(|n| format!("{} ({}){}", stem, n, ext))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| file_name.to_string())
    }
}
