//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! 空のシートや空の行範囲はエラーではありません（長さ0の結果として扱います）。

use thiserror::Error;

/// xlsxjsonクレート全体で使用するエラー型
///
/// バッチ処理やセッションでは、入力1件ごとのエラーは通知
/// （[`Notification`](crate::Notification)）に変換され、他の入力の処理は継続されます。
///
/// # エラーの種類
///
/// - `Io`: ローカルファイルの読み込み・保存の失敗
/// - `Decode`: バイト列が有効なワークブックではない（calamine由来）
/// - `InvalidReference`: 共有URLからドキュメントIDを抽出できない
/// - `Network`: リモートドキュメントの取得に失敗
/// - `Config`: 設定の検証に失敗、シートが存在しない等
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxjson::XlsxToJsonError;
/// use std::fs::File;
///
/// fn read_excel_file(path: &str) -> Result<(), XlsxToJsonError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToJsonError {
    /// I/O操作中に発生したエラー
    ///
    /// ファイルの読み込み失敗、ダウンロードファイルの保存失敗など。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// バイト列をワークブックとして解析できなかったエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse Excel file: {0}")]
    Decode(#[from] calamine::Error),

    /// 共有URLにドキュメントIDが含まれていないエラー
    ///
    /// このエラーが返された場合、ネットワークアクセスは行われていません。
    #[error("Invalid Google Sheet URL: {0}")]
    InvalidReference(String),

    /// リモートドキュメントの取得に失敗したエラー
    #[error("Network error: {0}")]
    Network(String),

    /// JSONシリアライズのエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIPアーカイブの書き込みエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `PipelineBuilder::build()`時の検証失敗や、存在しないシートの選択などで発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxjson::{PipelineBuilder, XlsxToJsonError};
    ///
    /// let result = PipelineBuilder::new()
    ///     .with_preview_limit(0)  // 無効なプレビュー行数
    ///     .build();
    ///
    /// match result {
    ///     Err(XlsxToJsonError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力サイズの上限超過や、アーカイブのエントリ名が安全でない場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for XlsxToJsonError {
    fn from(err: zip::result::ZipError) -> Self {
        XlsxToJsonError::Zip(err.to_string())
    }
}

/// クレート内で使用する`Result`型
pub type Result<T> = std::result::Result<T, XlsxToJsonError>;
