//! Session Module
//!
//! 単一ファイルの対話的な変換フローを保持するアダプター層。
//! 読み込んだワークブック、選択中のシート、行範囲、ユーザー向け通知を管理し、
//! 変換処理そのものは[`Pipeline`]に委譲します。

use std::fmt;
use std::path::Path;

use log::info;

use crate::builder::Pipeline;
use crate::error::{Result, XlsxToJsonError};
use crate::normalizer::{Record, SheetRecords};
use crate::output::{ClipboardText, Download, PreviewTable};
use crate::parser::Workbook;
use crate::remote::ByteSource;
use crate::window::{RowRange, RowWindow};

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// ユーザー向けの一時的な通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// 対話的な変換セッション
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxjson::{PipelineBuilder, Session};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let mut session = Session::new(PipelineBuilder::new().build()?);
/// session.load_file("report.xlsx")?;
/// session.select_sheet("Sheet1")?;
/// session.set_range(2, 20);
/// let clipboard = session.copy_json()?;
/// println!("{}", clipboard.as_str());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    pipeline: Pipeline,
    workbook: Option<Workbook>,
    current: Option<SheetRecords>,
    window: RowWindow,
    notifications: Vec<Notification>,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            workbook: None,
            current: None,
            window: RowWindow::Empty,
            notifications: Vec::new(),
        }
    }

    /// ワークブックのバイト列を読み込む
    ///
    /// 成功・失敗のいずれの場合も通知が追加されます。
    /// 読み込みに成功すると、シートの選択と行範囲はリセットされます。
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match self.pipeline.decode(bytes) {
            Ok(workbook) => {
                info!("session loaded workbook with {} sheets", workbook.len());
                self.workbook = Some(workbook);
                self.current = None;
                self.window = RowWindow::Empty;
                self.notify(Notification::success("Excel file parsed successfully"));
                Ok(())
            }
            Err(e) => {
                self.notify(Notification::error("Error parsing file"));
                Err(e)
            }
        }
    }

    /// ファイルを読み込む
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => self.load_bytes(&bytes),
            Err(e) => {
                self.notify(Notification::error("Error parsing file"));
                Err(e.into())
            }
        }
    }

    /// 共有URLからドキュメントを読み込む
    ///
    /// 先頭シートを先頭行モードで正規化し、行キー付きのレコードを現在のデータにします。
    /// シート一覧は空になります。
    pub fn load_remote(&mut self, url: &str, source: &dyn ByteSource) -> Result<()> {
        match self.pipeline.load_remote(url, source) {
            Ok(records) => {
                self.workbook = None;
                self.window = RowRange::full(records.len()).clamp(records.len());
                self.current = Some(records);
                self.notify(Notification::success("Google Sheet loaded"));
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    XlsxToJsonError::InvalidReference(_) => "Invalid Google Sheet URL",
                    _ => "Failed to fetch Google Sheet",
                };
                self.notify(Notification::error(message));
                Err(e)
            }
        }
    }

    /// 読み込んだワークブックのシート名
    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook
            .as_ref()
            .map(Workbook::sheet_names)
            .unwrap_or_default()
    }

    /// シートを選択して正規化する
    ///
    /// 行範囲は `(1, N)` にリセットされます。
    pub fn select_sheet(&mut self, name: &str) -> Result<()> {
        let workbook = self
            .workbook
            .as_ref()
            .ok_or_else(|| XlsxToJsonError::Config("No workbook loaded".to_string()))?;
        let sheet = workbook
            .sheet(name)
            .ok_or_else(|| XlsxToJsonError::Config(format!("Sheet '{}' not found", name)))?;

        let records = self.pipeline.normalize(sheet);
        self.window = RowRange::full(records.len()).clamp(records.len());
        self.current = Some(records);
        Ok(())
    }

    /// 選択中のシート名
    pub fn selected_sheet(&self) -> Option<&str> {
        self.current.as_ref().map(SheetRecords::sheet_name)
    }

    /// 行範囲を設定（クランプ後のウィンドウを返す）
    pub fn set_range(&mut self, start: usize, end: usize) -> RowWindow {
        self.window = RowRange::new(start, end).clamp(self.records().len());
        self.window
    }

    /// 現在の行範囲
    pub fn window(&self) -> RowWindow {
        self.window
    }

    /// 範囲スライダーの上限（レコード数）
    pub fn row_count(&self) -> usize {
        self.records().len()
    }

    /// 現在の列ヘッダー
    pub fn headers(&self) -> &[String] {
        self.current
            .as_ref()
            .map(SheetRecords::headers)
            .unwrap_or_default()
    }

    /// 現在のレコード列
    pub fn records(&self) -> &[Record] {
        self.current
            .as_ref()
            .map(SheetRecords::records)
            .unwrap_or_default()
    }

    /// プレビュー対象のレコード（行範囲の先頭から最大でプレビュー上限まで）
    pub fn preview(&self) -> &[Record] {
        self.window
            .preview(self.pipeline.preview_limit())
            .slice(self.records())
    }

    /// プレビュー表
    pub fn preview_table(&self) -> PreviewTable {
        PreviewTable::new(self.headers(), self.preview())
    }

    /// 行範囲のレコードをクリップボード用のJSONテキストとして出力
    pub fn copy_json(&mut self) -> Result<ClipboardText> {
        let text = self
            .pipeline
            .export_clipboard(self.records(), self.requested_range())?;
        self.notify(Notification::success("JSON copied to clipboard"));
        Ok(text)
    }

    /// 行範囲のレコードをJSONファイルとして出力
    pub fn export_json_file(&self, file_name: impl Into<String>) -> Result<Download> {
        self.pipeline
            .export_download(self.records(), self.requested_range(), file_name)
    }

    /// 蓄積された通知
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// 蓄積された通知を取り出す
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn requested_range(&self) -> RowRange {
        self.window.range().unwrap_or(RowRange::new(1, 0))
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
