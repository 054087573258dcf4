//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 列ヘッダーの導出方式
///
/// 呼び出し側が呼び出しごとに選択します（自動判定は行いません）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum HeaderMode {
    /// シートの列範囲から列名（A, B, C, ...）を導出（デフォルト）
    ///
    /// 宣言範囲内のすべての行がレコードになります。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [
    ///   { "A": "Name", "B": "Age" },
    ///   { "A": "Ann", "B": 30 }
    /// ]
    /// ```
    #[default]
    Positional,

    /// 先頭行の値をヘッダーとして使用
    ///
    /// 2行目以降がレコードになります。先頭行しかないシートはレコード0件です。
    /// 空のヘッダーセルは`__EMPTY`、重複したヘッダーには`_1`, `_2`, ...が付与されます。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [
    ///   { "Name": "Ann", "Age": 30 }
    /// ]
    /// ```
    FirstRow,
}

/// 日付の出力形式
///
/// Excelの日付セルをレコードの文字列値に変換する際の出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD、時刻を含む場合はYYYY-MM-DDTHH:MM:SS）
    #[default]
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxjson::{PipelineBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
    /// let pipeline = PipelineBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y/%m/%d".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

/// エクスポート先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSink {
    /// クリップボード用のテキストとして返す
    Clipboard,

    /// 指定したファイル名のダウンロードファイルとして返す
    Download {
        /// ファイル名（例: `sheet-data.json`）
        file_name: String,
    },
}

impl ExportSink {
    /// デフォルト名（`sheet-data.json`）のダウンロード
    pub fn download() -> Self {
        ExportSink::Download {
            file_name: crate::output::DEFAULT_JSON_FILE_NAME.to_string(),
        }
    }
}
