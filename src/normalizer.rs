//! Normalizer Module
//!
//! シートのセルグリッドを列ヘッダーと順序付きレコード列に変換するモジュール。
//! ヘッダーはシートごとに1回だけ導出され、すべてのレコードで共有されます。

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::api::HeaderMode;
use crate::parser::Sheet;
use crate::types::{column_letter, CellSpan, CellValue};

/// 行キーのデフォルトのフィールド名
pub const DEFAULT_ROW_KEY_FIELD: &str = "__rowKey";

/// 先頭行モードで空のヘッダーセルに付与する名前
const EMPTY_HEADER: &str = "__EMPTY";

/// 合成行キー
///
/// 一覧表示などで安定した識別子が必要な利用者のための派生フィールドです。
/// JSONではレコードの末尾に通常のフィールドとして出力されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    field: Arc<str>,
    value: String,
}

impl RowKey {
    /// フィールド名
    pub fn field(&self) -> &str {
        &self.field
    }

    /// キー値（`row-{index}`）
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// 1行分のレコード
///
/// ヘッダー順の値を保持します。値のないセルは空文字列として扱われ、
/// キーが欠落することはありません。
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Vec<CellValue>,
    index: usize,
    row_key: Option<RowKey>,
}

impl Record {
    /// シート内の行番号（1始まり）
    pub fn index(&self) -> usize {
        self.index
    }

    /// 列ヘッダー
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// ヘッダー順の値
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// ヘッダー名で値を取得
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| &self.values[i])
    }

    /// ヘッダーと値のペアを順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// 合成行キー
    pub fn row_key(&self) -> Option<&RowKey> {
        self.row_key.as_ref()
    }

    /// 合成行キーを付与したレコードを返す
    pub fn with_row_key(mut self, field: impl Into<Arc<str>>) -> Self {
        self.row_key = Some(RowKey {
            field: field.into(),
            value: format!("row-{}", self.index),
        });
        self
    }

    /// 行キーを含むフィールド数
    pub fn field_count(&self) -> usize {
        self.values.len() + usize::from(self.row_key.is_some())
    }

    /// すべての値が空かどうか
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;
        for (header, value) in self.iter() {
            map.serialize_entry(header, value)?;
        }
        if let Some(key) = &self.row_key {
            map.serialize_entry(key.field(), key.value())?;
        }
        map.end()
    }
}

/// 1シート分の正規化結果
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecords {
    sheet_name: String,
    headers: Arc<[String]>,
    records: Vec<Record>,
}

impl SheetRecords {
    /// シート名
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// 列ヘッダー
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// レコード列
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// レコード数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// レコードが0件かどうか
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// レコード列を取り出す
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// シートノーマライザー
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{CellCoord, CellValue, HeaderMode, Sheet, SheetNormalizer};
///
/// let sheet = Sheet::from_rows(
///     "People",
///     CellCoord::new(0, 0),
///     vec![
///         vec![CellValue::from("Name"), CellValue::from("Age")],
///         vec![CellValue::from("Ann"), CellValue::from(30.0)],
///     ],
/// );
///
/// let records = SheetNormalizer::new(HeaderMode::FirstRow).normalize(&sheet);
/// assert_eq!(records.headers(), ["Name", "Age"]);
/// assert_eq!(records.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SheetNormalizer {
    mode: HeaderMode,
    skip_blank_rows: bool,
    row_key_field: Option<Arc<str>>,
}

impl SheetNormalizer {
    /// ヘッダー導出方式を指定して生成
    pub fn new(mode: HeaderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// すべての値が空の行をスキップするか
    pub fn skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }

    /// 各レコードに合成行キーを付与する
    pub fn with_row_keys(mut self, field: impl Into<Arc<str>>) -> Self {
        self.row_key_field = Some(field.into());
        self
    }

    /// シートを正規化
    ///
    /// 宣言範囲を持たないシートは、空のヘッダーと空のレコード列になります（エラーではありません）。
    pub fn normalize(&self, sheet: &Sheet) -> SheetRecords {
        let Some(span) = sheet.span() else {
            debug!("sheet '{}' has no declared range", sheet.name());
            return SheetRecords {
                sheet_name: sheet.name().to_string(),
                headers: Arc::from(Vec::new()),
                records: Vec::new(),
            };
        };

        let (headers, first_data_row) = match self.mode {
            HeaderMode::Positional => (positional_headers(&span), span.start.row),
            HeaderMode::FirstRow => (
                first_row_headers(sheet, &span, self.row_key_field.as_deref()),
                span.start.row + 1,
            ),
        };
        let headers: Arc<[String]> = Arc::from(headers);

        let mut records = Vec::new();
        for row in first_data_row..=span.end.row {
            let values = span.cols().map(|col| sheet.cell(row, col).clone()).collect();
            let record = Record {
                headers: Arc::clone(&headers),
                values,
                index: (row - first_data_row) as usize + 1,
                row_key: None,
            };

            if self.skip_blank_rows && record.is_blank() {
                continue;
            }

            records.push(match &self.row_key_field {
                Some(field) => record.with_row_key(Arc::clone(field)),
                None => record,
            });
        }

        debug!(
            "normalized sheet '{}': {} headers, {} records ({:?})",
            sheet.name(),
            headers.len(),
            records.len(),
            self.mode
        );

        SheetRecords {
            sheet_name: sheet.name().to_string(),
            headers,
            records,
        }
    }
}

/// 宣言範囲の列から列名ヘッダー（A, B, ...）を導出
pub fn positional_headers(span: &CellSpan) -> Vec<String> {
    span.cols().map(column_letter).collect()
}

/// 先頭行の値からヘッダーを導出
///
/// 空のセルは`__EMPTY`、重複した名前には`_1`, `_2`, ...を付与して一意にします。
/// 行キーのフィールド名は予約済みとして扱い、同名の列は`_1`付きの名前になります。
fn first_row_headers(sheet: &Sheet, span: &CellSpan, reserved: Option<&str>) -> Vec<String> {
    let mut seen: HashSet<String> = reserved.map(str::to_string).into_iter().collect();
    span.cols()
        .map(|col| {
            let text = sheet.cell(span.start.row, col).as_text();
            let base = if text.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                text
            };

            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}
