//! Builder Module
//!
//! Fluent Builder APIを提供し、`Pipeline`インスタンスを段階的に構築する。
//!
//! 単一ファイルの表示、複数ファイルのバッチエクスポート、リモート読み込みは
//! すべて同じ`Pipeline`を通り、ヘッダー導出方式と出力先だけが異なります。

use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use log::{info, warn};

use crate::api::{DateFormat, ExportSink, HeaderMode, SheetSelector};
use crate::error::{Result, XlsxToJsonError};
use crate::normalizer::{Record, SheetNormalizer, SheetRecords, DEFAULT_ROW_KEY_FIELD};
use crate::output::{
    ArchiveBuilder, ArchiveEntrySummary, ClipboardText, Download, ExportOutput, ExportPayload, JsonExporter,
    DEFAULT_ARCHIVE_NAME,
};
use crate::parser::{CalamineDecoder, Sheet, Workbook, WorkbookDecoder};
use crate::remote::{ByteSource, RemoteSheetFetcher};
use crate::security::validate_zip_path;
use crate::session::Notification;
use crate::window::{RowRange, PREVIEW_ROW_LIMIT};

/// バッチ処理の対象とするファイル拡張子のデフォルト値
pub const DEFAULT_EXTENSION_FILTER: &str = ".xlsx";

/// パイプラインの設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// ヘッダー導出方式
    pub header_mode: HeaderMode,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 行キーのフィールド名（Noneの場合は付与しない）
    pub row_key_field: Option<String>,

    /// 空行をスキップするか
    pub skip_blank_rows: bool,

    /// 日付形式
    pub date_format: DateFormat,

    /// プレビューの最大行数
    pub preview_limit: usize,

    /// バッチエクスポートのアーカイブ名
    pub archive_name: String,

    /// バッチ処理の拡張子フィルター
    pub extension_filter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::Positional,
            sheet_selector: SheetSelector::All,
            row_key_field: None,
            skip_blank_rows: false,
            date_format: DateFormat::Iso8601,
            preview_limit: PREVIEW_ROW_LIMIT,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            extension_filter: DEFAULT_EXTENSION_FILTER.to_string(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{HeaderMode, PipelineBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let pipeline = PipelineBuilder::new()
///     .with_header_mode(HeaderMode::FirstRow)
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_row_keys(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PipelineBuilder {
    /// 内部設定（構築中）
    config: PipelineConfig,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - ヘッダー導出: 列名（A, B, C, ...）
    /// - シート選択: すべてのシート
    /// - 行キー: 付与しない
    /// - 日付形式: ISO 8601
    /// - プレビュー: 10行
    /// - アーカイブ名: `excel_json_export.zip`
    /// - 拡張子フィルター: `.xlsx`
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// 列ヘッダーの導出方式を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxjson::{HeaderMode, PipelineBuilder};
    ///
    /// let builder = PipelineBuilder::new().with_header_mode(HeaderMode::FirstRow);
    /// ```
    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.config.header_mode = mode;
        self
    }

    /// 変換対象のシートを選択する
    ///
    /// # 引数
    ///
    /// * `selector: SheetSelector`: シート選択方式
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxjson::{PipelineBuilder, SheetSelector};
    ///
    /// // 単一シートを名前で指定
    /// let builder = PipelineBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Sheet1".to_string()));
    ///
    /// // 複数シートを指定
    /// let builder = PipelineBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Indices(vec![0, 2]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 各レコードに合成行キー（`row-{index}`）を付与するかを指定する
    ///
    /// フィールド名は`with_row_key_field`で変更しない限り`__rowKey`です。
    pub fn with_row_keys(mut self, enabled: bool) -> Self {
        self.config.row_key_field = if enabled {
            Some(
                self.config
                    .row_key_field
                    .take()
                    .unwrap_or_else(|| DEFAULT_ROW_KEY_FIELD.to_string()),
            )
        } else {
            None
        };
        self
    }

    /// 合成行キーのフィールド名を指定する（行キーも有効になります）
    pub fn with_row_key_field(mut self, field: impl Into<String>) -> Self {
        self.config.row_key_field = Some(field.into());
        self
    }

    /// すべての値が空の行をスキップするかを指定する
    pub fn skip_blank_rows(mut self, skip: bool) -> Self {
        self.config.skip_blank_rows = skip;
        self
    }

    /// 日付の出力形式を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxjson::{DateFormat, PipelineBuilder};
    ///
    /// let builder = PipelineBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()));
    /// ```
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// プレビューの最大行数を指定する（1以上）
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.config.preview_limit = limit;
        self
    }

    /// バッチエクスポートのアーカイブ名を指定する（`.zip`で終わる必要があります）
    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.archive_name = name.into();
        self
    }

    /// バッチ処理で受け付けるファイル拡張子を指定する
    pub fn with_extension_filter(mut self, extension: impl Into<String>) -> Self {
        self.config.extension_filter = extension.into();
        self
    }

    /// 設定を検証し、`Pipeline`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Pipeline)`: 設定が有効な場合
    /// * `Err(XlsxToJsonError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * プレビュー行数が0
    /// * アーカイブ名が`.zip`で終わらない
    /// * 拡張子フィルターまたは行キーのフィールド名が空
    /// * カスタム日付形式が不正な書式文字列
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config;

        if config.preview_limit == 0 {
            return Err(XlsxToJsonError::Config(
                "Preview limit must be greater than 0".to_string(),
            ));
        }

        let archive_stem_len = config.archive_name.len().saturating_sub(".zip".len());
        if !has_suffix_ignore_case(&config.archive_name, ".zip") || archive_stem_len == 0 {
            return Err(XlsxToJsonError::Config(format!(
                "Archive name must end with .zip: '{}'",
                config.archive_name
            )));
        }

        if config.extension_filter.is_empty() {
            return Err(XlsxToJsonError::Config(
                "Extension filter must not be empty".to_string(),
            ));
        }

        if matches!(&config.row_key_field, Some(field) if field.is_empty()) {
            return Err(XlsxToJsonError::Config(
                "Row key field must not be empty".to_string(),
            ));
        }

        // 列名ヘッダー（A, B, ...）と衝突する行キー名は拒否
        if let (HeaderMode::Positional, Some(field)) = (config.header_mode, &config.row_key_field) {
            if field.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(XlsxToJsonError::Config(format!(
                    "Row key field '{}' collides with column headers",
                    field
                )));
            }
        }

        if let DateFormat::Custom(ref format_str) = config.date_format {
            let invalid = format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(XlsxToJsonError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        Ok(Pipeline::new(config))
    }
}

/// バッチ処理の入力ファイル
///
/// パスで指定した場合、内容は処理の直前に読み込まれます。
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    content: SourceContent,
}

#[derive(Debug, Clone)]
enum SourceContent {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl SourceFile {
    /// ファイルパスから生成（名前はファイル名部分）
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            content: SourceContent::Path(path),
        }
    }

    /// 名前とバイト列から生成
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: SourceContent::Bytes(bytes),
        }
    }

    /// ファイル名
    pub fn name(&self) -> &str {
        &self.name
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match self.content {
            SourceContent::Path(path) => Ok(fs::read(path)?),
            SourceContent::Bytes(bytes) => Ok(bytes),
        }
    }
}

/// バッチエクスポートの結果
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// ZIPアーカイブ
    pub archive: Download,

    /// アーカイブに含まれるJSONファイル（追加順）
    pub entries: Vec<ArchiveEntrySummary>,

    /// 拡張子フィルターにより除外されたファイル名
    pub skipped: Vec<String>,

    /// ファイルごとの処理結果の通知
    pub notifications: Vec<Notification>,
}

impl BatchReport {
    /// エラー通知の件数
    pub fn error_count(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_error()).count()
    }
}

/// 変換パイプライン
///
/// デコード、正規化、行範囲の選択、JSON出力を1つの経路で提供します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxjson::{ExportSink, PipelineBuilder, RowRange};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let pipeline = PipelineBuilder::new().build()?;
/// let sheets = pipeline.load_file("report.xlsx")?;
/// let output = pipeline.export(sheets[0].records(), RowRange::new(1, 20), &ExportSink::Clipboard)?;
/// println!("{}", output.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    /// 設定
    config: PipelineConfig,

    /// ワークブックデコーダー
    decoder: CalamineDecoder,

    /// 設定に基づくノーマライザー
    normalizer: SheetNormalizer,

    /// JSONエクスポーター
    exporter: JsonExporter,
}

impl Pipeline {
    pub(crate) fn new(config: PipelineConfig) -> Self {
        let mut normalizer =
            SheetNormalizer::new(config.header_mode).skip_blank_rows(config.skip_blank_rows);
        if let Some(field) = &config.row_key_field {
            normalizer = normalizer.with_row_keys(field.as_str());
        }

        Self {
            decoder: CalamineDecoder::new(config.date_format.clone()),
            normalizer,
            exporter: JsonExporter,
            config,
        }
    }

    /// プレビューの最大行数
    pub fn preview_limit(&self) -> usize {
        self.config.preview_limit
    }

    /// ヘッダー導出方式
    pub fn header_mode(&self) -> HeaderMode {
        self.config.header_mode
    }

    /// バイト列をワークブックにデコード
    pub fn decode(&self, bytes: &[u8]) -> Result<Workbook> {
        self.decoder.decode(bytes)
    }

    /// シートを正規化
    pub fn normalize(&self, sheet: &Sheet) -> SheetRecords {
        self.normalizer.normalize(sheet)
    }

    /// バイト列を読み込み、選択されたシートを正規化
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<SheetRecords>)` - 選択順のシートごとのレコード
    /// * `Err(XlsxToJsonError::Decode)` - ワークブックとして解析できない場合
    /// * `Err(XlsxToJsonError::Config)` - 選択したシートが存在しない場合
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Vec<SheetRecords>> {
        let workbook = self.decode(bytes)?;
        let sheets = workbook.select(&self.config.sheet_selector)?;
        Ok(sheets.into_iter().map(|sheet| self.normalize(sheet)).collect())
    }

    /// ファイルを読み込み、選択されたシートを正規化
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<SheetRecords>> {
        let bytes = fs::read(path.as_ref())?;
        let sheets = self.load_bytes(&bytes)?;
        info!(
            "loaded {} sheets from {}",
            sheets.len(),
            path.as_ref().display()
        );
        Ok(sheets)
    }

    /// 共有URLからドキュメントを取得し、先頭シートを正規化
    ///
    /// ヘッダー導出方式の設定に関わらず先頭行モードで正規化し、行キーを付与します。
    /// URLが不正な場合は取得を行いません。
    pub fn load_remote(&self, url: &str, source: &dyn ByteSource) -> Result<SheetRecords> {
        let workbook = RemoteSheetFetcher::new(source).fetch_workbook(url, &self.decoder)?;
        let sheet = workbook
            .first_sheet()
            .ok_or_else(|| XlsxToJsonError::Config("Workbook has no sheets".to_string()))?;

        let field = self
            .config
            .row_key_field
            .as_deref()
            .unwrap_or(DEFAULT_ROW_KEY_FIELD);
        let records = SheetNormalizer::new(HeaderMode::FirstRow)
            .skip_blank_rows(self.config.skip_blank_rows)
            .with_row_keys(field)
            .normalize(sheet);

        info!(
            "loaded remote sheet '{}' with {} records",
            records.sheet_name(),
            records.len()
        );
        Ok(records)
    }

    /// 要求された行範囲のレコードを出力
    ///
    /// 行範囲はレコード数に対してクランプされます。レコードが0件の場合は`[]`を出力します。
    pub fn export(
        &self,
        records: &[Record],
        requested: RowRange,
        sink: &ExportSink,
    ) -> Result<ExportOutput> {
        let window = requested.clamp(records.len());
        self.exporter.export(records, window, sink)
    }

    /// 行範囲のレコードをクリップボード用テキストとして出力
    pub fn export_clipboard(&self, records: &[Record], requested: RowRange) -> Result<ClipboardText> {
        self.exporter
            .clipboard(records, requested.clamp(records.len()))
    }

    /// 行範囲のレコードをJSONファイルとして出力
    pub fn export_download(
        &self,
        records: &[Record],
        requested: RowRange,
        file_name: impl Into<String>,
    ) -> Result<Download> {
        self.exporter
            .download(records, requested.clamp(records.len()), file_name.into())
    }

    /// 複数ファイルを変換してZIPアーカイブにまとめる
    ///
    /// ファイルは順に1つずつ処理されます。拡張子フィルターに一致しないファイルはスキップされ、
    /// 読み込みや解析に失敗したファイルはエラー通知として記録され、残りのファイルの処理は継続します。
    /// 失敗したファイルのエントリがアーカイブに含まれることはありません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(BatchReport)` - アーカイブと処理結果
    /// * `Err(XlsxToJsonError::Zip)` - アーカイブの書き込みに失敗した場合
    pub fn export_batch<I>(&self, sources: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let mut archive = ArchiveBuilder::new(self.config.archive_name.as_str());
        let mut skipped = Vec::new();
        let mut notifications = Vec::new();

        for source in sources {
            let name = source.name().to_string();
            let Some(base_name) = strip_suffix_ignore_case(&name, &self.config.extension_filter)
            else {
                warn!(
                    "skipping {}: not a {} file",
                    name, self.config.extension_filter
                );
                skipped.push(name);
                continue;
            };
            let base_name = base_name.to_string();

            match self.convert_source(source, &base_name) {
                Ok(payloads) => {
                    let sheet_count = payloads.len();
                    for payload in payloads {
                        archive.add(payload)?;
                    }
                    info!("exported {} sheets from {}", sheet_count, name);
                    notifications.push(Notification::success(format!(
                        "Exported {} sheets from {}",
                        sheet_count, name
                    )));
                }
                Err(e) => {
                    warn!("skipping {}: {}", name, e);
                    notifications.push(Notification::error(format!(
                        "Error parsing file {}: {}",
                        name, e
                    )));
                }
            }
        }

        let entries = archive.entries().to_vec();
        let archive = archive.finish()?;

        Ok(BatchReport {
            archive,
            entries,
            skipped,
            notifications,
        })
    }

    /// ファイルパスの一覧を変換してZIPアーカイブにまとめる
    pub fn export_batch_paths<I, P>(&self, paths: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.export_batch(paths.into_iter().map(SourceFile::from_path))
    }

    /// 1ファイル分のペイロードをすべて生成
    ///
    /// いずれかのシートで失敗した場合は、そのファイルのペイロードを1つも返しません。
    fn convert_source(&self, source: SourceFile, base_name: &str) -> Result<Vec<ExportPayload>> {
        let bytes = source.into_bytes()?;
        let sheets = self.load_bytes(&bytes)?;

        sheets
            .iter()
            .map(|sheet| {
                let file_name = ExportPayload::sheet_file_name(base_name, sheet.sheet_name());
                validate_zip_path(&file_name).map_err(XlsxToJsonError::SecurityViolation)?;
                self.exporter.payload(file_name, sheet.records())
            })
            .collect()
    }
}

/// 大文字小文字を区別せずに接尾辞を取り除く
fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (base, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(base)
}

fn has_suffix_ignore_case(name: &str, suffix: &str) -> bool {
    strip_suffix_ignore_case(name, suffix).is_some()
}
