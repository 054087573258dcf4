//! Preview Table
//!
//! レコードの先頭部分を固定幅のテキスト表として描画します。
//! 列幅は表示幅で計算されるため、全角文字を含むセルでも列が揃います。

use std::fmt;
use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::normalizer::Record;

/// 区切り行の最小幅
const MIN_COLUMN_WIDTH: usize = 3;

/// プレビュー表
///
/// 1行目はヘッダー、2行目は区切り行で、以降が各レコードです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PreviewTable {
    /// ヘッダーとレコード列から表を生成
    ///
    /// 行キーは表示しません。
    pub fn new(headers: &[String], records: &[Record]) -> Self {
        let headers = headers.iter().map(|h| escape_cell(h)).collect();
        let rows = records
            .iter()
            .map(|record| {
                record
                    .values()
                    .iter()
                    .map(|value| escape_cell(&value.as_text()))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// 列ヘッダー
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 表示行数（ヘッダーを除く）
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 表を描画
    ///
    /// 列が1つもない場合は何も出力しません。
    pub fn render<W: Write>(&self, writer: &mut W) -> Result<()> {
        for line in self.lines() {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        let widths = self.column_widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.headers, &widths));
        lines.push(separator(&widths));
        for row in &self.rows {
            lines.push(format_row(row, &widths));
        }
        lines
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| h.width().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        widths
    }
}

impl fmt::Display for PreviewTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
        line.push_str(" |");
    }
    line
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('|');
    }
    line
}

/// 表の構造を崩す文字を置き換える
fn escape_cell(text: &str) -> String {
    text.trim()
        .replace(['\r', '\n'], " ")
        .replace('|', "\\|")
}
