//! Workbook Module
//!
//! ワークブック・シートのデータモデルと、calamineによるデコーダーの実装。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use log::debug;

use crate::api::{DateFormat, SheetSelector};
use crate::error::{Result, XlsxToJsonError};
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellSpan, CellValue};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 1枚のシート
///
/// 宣言範囲（[`CellSpan`]）を覆う稠密なセルグリッドを保持します。
/// 宣言範囲を持たないシートは0行0列です。
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    span: Option<CellSpan>,
    /// 宣言範囲内のセル（行優先）
    cells: Vec<CellValue>,
}

impl Sheet {
    /// 宣言範囲を持たない空のシートを生成
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: None,
            cells: Vec::new(),
        }
    }

    /// 行データからシートを生成
    ///
    /// `origin`は左上セルの座標です。列数は最も長い行に合わせ、
    /// 足りないセルは空セルで埋めます。行が1つもない（または全行が空配列の）場合は
    /// 宣言範囲を持たないシートになります。
    pub fn from_rows(name: impl Into<String>, origin: CellCoord, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Self::empty(name);
        }

        let height = rows.len();
        let end = CellCoord::new(
            origin.row + height as u32 - 1,
            origin.col + width as u32 - 1,
        );

        let mut cells = Vec::with_capacity(width * height);
        for mut row in rows {
            row.resize(width, CellValue::Empty);
            cells.extend(row);
        }

        Self {
            name: name.into(),
            span: CellSpan::new(origin, end),
            cells,
        }
    }

    /// 宣言範囲とセル（行優先）からシートを生成
    ///
    /// セル数が範囲のサイズと一致しない場合は`Config`エラーになります。
    pub fn with_span(
        name: impl Into<String>,
        span: CellSpan,
        cells: Vec<CellValue>,
    ) -> Result<Self> {
        let (rows, cols) = span.size();
        if cells.len() != rows * cols {
            return Err(XlsxToJsonError::Config(format!(
                "Sheet span {} expects {} cells, got {}",
                span.to_a1_notation(),
                rows * cols,
                cells.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            span: Some(span),
            cells,
        })
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 宣言範囲
    pub fn span(&self) -> Option<CellSpan> {
        self.span
    }

    /// 行数
    pub fn row_count(&self) -> usize {
        self.span.map(|span| span.size().0).unwrap_or(0)
    }

    /// 列数
    pub fn col_count(&self) -> usize {
        self.span.map(|span| span.size().1).unwrap_or(0)
    }

    /// 絶対座標でセルを取得
    ///
    /// 範囲外のセルは空セルとして返します。
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        let Some(span) = self.span else {
            return &EMPTY_CELL;
        };
        if !span.contains(CellCoord::new(row, col)) {
            return &EMPTY_CELL;
        }
        let (_, width) = span.size();
        let index = (row - span.start.row) as usize * width + (col - span.start.col) as usize;
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }
}

/// ワークブック
///
/// 順序付きのシート集合です。シート名はワークブック内で一意です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// シートのリストからワークブックを生成
    ///
    /// シート名が重複している場合は`Config`エラーになります。
    pub fn new(sheets: Vec<Sheet>) -> Result<Self> {
        for (i, sheet) in sheets.iter().enumerate() {
            if sheets[..i].iter().any(|other| other.name == sheet.name) {
                return Err(XlsxToJsonError::Config(format!(
                    "Duplicate sheet name '{}'",
                    sheet.name
                )));
            }
        }
        Ok(Self { sheets })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// すべてのシート
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// シート名でシートを取得
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// 先頭のシート
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// シート数
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// シートを1枚も持たないかどうか
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<&Sheet>)` - 選択されたシートのリスト
    /// * `Err(XlsxToJsonError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select(&self, selector: &SheetSelector) -> Result<Vec<&Sheet>> {
        let by_index = |index: usize| {
            self.sheets.get(index).ok_or_else(|| {
                XlsxToJsonError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    self.sheets.len()
                ))
            })
        };
        let by_name = |name: &str| {
            self.sheet(name)
                .ok_or_else(|| XlsxToJsonError::Config(format!("Sheet '{}' not found", name)))
        };

        match selector {
            SheetSelector::All => Ok(self.sheets.iter().collect()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| by_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(|name| by_name(name)).collect(),
        }
    }
}

/// ワークブックデコーダー
///
/// バイト列をワークブックに変換する外部機能の抽象化です。
pub trait WorkbookDecoder {
    /// バイト列をデコード
    ///
    /// 不正なバイト列の場合は`Decode`エラーを返します。
    fn decode(&self, bytes: &[u8]) -> Result<Workbook>;
}

/// calamineによるデコーダー
///
/// calamineが判別できる形式（XLSX, XLS, XLSB, ODS）を受け付けます。
#[derive(Debug, Clone, Default)]
pub struct CalamineDecoder {
    formatter: CellFormatter,
    security: SecurityConfig,
}

impl CalamineDecoder {
    /// 日付形式を指定してデコーダーを生成
    pub fn new(date_format: DateFormat) -> Self {
        Self {
            formatter: CellFormatter::new(date_format),
            security: SecurityConfig::default(),
        }
    }

    /// calamineの範囲をシートに変換
    fn convert_range(&self, name: &str, range: &Range<Data>) -> Result<Sheet> {
        let (Some(start), Some(end)) = (range.start(), range.end()) else {
            return Ok(Sheet::empty(name));
        };

        let mut cells = Vec::with_capacity(range.width() * range.height());
        for row in range.rows() {
            for cell in row {
                cells.push(self.formatter.format_cell(cell));
            }
        }

        let span = CellSpan::new(CellCoord::new(start.0, start.1), CellCoord::new(end.0, end.1))
            .ok_or_else(|| {
                XlsxToJsonError::Config(format!("Sheet '{}' has an inverted range", name))
            })?;
        Sheet::with_span(name, span, cells)
    }
}

impl WorkbookDecoder for CalamineDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Workbook> {
        self.security.check_input_size(bytes.len())?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let sheet = self.convert_range(&name, &range)?;
            debug!(
                "decoded sheet '{}' ({} rows x {} cols)",
                name,
                sheet.row_count(),
                sheet.col_count()
            );
            sheets.push(sheet);
        }

        Workbook::new(sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_rows(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|row| row.iter().map(|s| CellValue::from(*s)).collect())
            .collect()
    }

    #[test]
    fn test_empty_sheet_has_no_span() {
        let sheet = Sheet::empty("Blank");
        assert_eq!(sheet.span(), None);
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.col_count(), 0);
        assert_eq!(sheet.cell(0, 0), &CellValue::Empty);
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let sheet = Sheet::from_rows(
            "Data",
            CellCoord::new(0, 0),
            text_rows(&[&["a", "b", "c"], &["d"]]),
        );

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.cell(1, 0), &CellValue::from("d"));
        assert_eq!(sheet.cell(1, 2), &CellValue::Empty);
    }

    #[test]
    fn test_from_rows_with_offset_origin() {
        let sheet = Sheet::from_rows("Data", CellCoord::new(2, 1), text_rows(&[&["x", "y"]]));

        let span = sheet.span().unwrap();
        assert_eq!(span.to_a1_notation(), "B3:C3");
        assert_eq!(sheet.cell(2, 1), &CellValue::from("x"));
        // 範囲外は空セル
        assert_eq!(sheet.cell(0, 0), &CellValue::Empty);
        assert_eq!(sheet.cell(2, 5), &CellValue::Empty);
    }

    #[test]
    fn test_from_rows_without_cells_is_empty() {
        let sheet = Sheet::from_rows("Data", CellCoord::new(0, 0), vec![vec![], vec![]]);
        assert_eq!(sheet.span(), None);
    }

    #[test]
    fn test_with_span_checks_cell_count() {
        let span = CellSpan::new(CellCoord::new(0, 0), CellCoord::new(1, 1)).unwrap();
        assert!(Sheet::with_span("S", span, vec![CellValue::Empty; 4]).is_ok());
        assert!(matches!(
            Sheet::with_span("S", span, vec![CellValue::Empty; 3]),
            Err(XlsxToJsonError::Config(_))
        ));
    }

    #[test]
    fn test_workbook_rejects_duplicate_names() {
        let result = Workbook::new(vec![Sheet::empty("A"), Sheet::empty("A")]);
        match result {
            Err(XlsxToJsonError::Config(msg)) => assert!(msg.contains("Duplicate")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_workbook_select() {
        let workbook = Workbook::new(vec![
            Sheet::empty("Sheet1"),
            Sheet::empty("Sheet2"),
            Sheet::empty("Sheet3"),
        ])
        .unwrap();

        assert_eq!(workbook.select(&SheetSelector::All).unwrap().len(), 3);

        let selected = workbook.select(&SheetSelector::Index(1)).unwrap();
        assert_eq!(selected[0].name(), "Sheet2");

        let selected = workbook
            .select(&SheetSelector::Names(vec![
                "Sheet3".to_string(),
                "Sheet1".to_string(),
            ]))
            .unwrap();
        assert_eq!(
            selected.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["Sheet3", "Sheet1"]
        );

        assert!(workbook.select(&SheetSelector::Index(3)).is_err());
        assert!(workbook
            .select(&SheetSelector::Name("Missing".to_string()))
            .is_err());
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let decoder = CalamineDecoder::default();
        let result = decoder.decode(b"This is not an Excel file");
        assert!(matches!(result, Err(XlsxToJsonError::Decode(_))));
    }
}
