//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::ser::{Serialize, Serializer};

/// セルの値を表す列挙型
///
/// レコードに格納されるスカラー値です。値を持たないセルは`Empty`となり、
/// JSONでは空文字列`""`として出力されます。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// 文字列
    String(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Bool(bool),

    /// 空セル
    #[default]
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    ///
    /// 空文字列も空として扱います。
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 値を文字列として取得
    ///
    /// 整数値の数値は小数点なしで出力します（例: `30.0` -> `"30"`）。
    pub fn as_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => match integral_value(*n) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Number(n) => match integral_value(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Empty => serializer.serialize_str(""),
        }
    }
}

/// 整数として表現できる数値であれば`i64`を返す
fn integral_value(n: f64) -> Option<i64> {
    // 2^53 を超えると f64 -> i64 の変換が正確でなくなる
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Some(n as i64)
    } else {
        None
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        format!("{}{}", column_letter(self.col), self.row + 1)
    }
}

/// 列インデックスをExcel列名に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
pub fn column_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// シートの宣言範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellSpan {
    /// 新しい範囲を生成
    ///
    /// 開始座標が終了座標より大きい場合は`None`を返します。
    pub fn new(start: CellCoord, end: CellCoord) -> Option<Self> {
        if start.row > end.row || start.col > end.col {
            return None;
        }
        Some(Self { start, end })
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// 範囲のサイズ（行数, 列数）
    pub fn size(&self) -> (usize, usize) {
        let rows = (self.end.row - self.start.row) as usize + 1;
        let cols = (self.end.col - self.start.col) as usize + 1;
        (rows, cols)
    }

    /// 範囲内の行インデックス
    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start.row..=self.end.row
    }

    /// 範囲内の列インデックス
    pub fn cols(&self) -> std::ops::RangeInclusive<u32> {
        self.start.col..=self.end.col
    }

    /// A1形式の範囲表記（例: "A1:C10"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        format!(
            "{}:{}",
            self.start.to_a1_notation(),
            self.end.to_a1_notation()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // CellValue のテスト
    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::String(String::new()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::String("test".to_string()).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
    }

    #[test]
    fn test_cell_value_as_text() {
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::Number(42.5).as_text(), "42.5");
        assert_eq!(CellValue::Number(30.0).as_text(), "30");
        assert_eq!(CellValue::from("hello").as_text(), "hello");
        assert_eq!(CellValue::Bool(true).as_text(), "true");
    }

    #[test]
    fn test_cell_value_serialize() {
        assert_eq!(serde_json::to_string(&CellValue::Empty).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&CellValue::Number(30.0)).unwrap(), "30");
        assert_eq!(serde_json::to_string(&CellValue::Number(-1.25)).unwrap(), "-1.25");
        assert_eq!(serde_json::to_string(&CellValue::Bool(false)).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&CellValue::from("a\"b")).unwrap(),
            "\"a\\\"b\""
        );
    }

    #[test]
    fn test_large_number_keeps_float_form() {
        let huge = 1.0e20;
        let json = serde_json::to_string(&CellValue::Number(huge)).unwrap();
        let parsed: f64 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, huge);
    }

    // CellCoord のテスト
    #[test]
    fn test_cell_coord_to_a1_notation() {
        assert_eq!(CellCoord::new(0, 0).to_a1_notation(), "A1");
        assert_eq!(CellCoord::new(0, 25).to_a1_notation(), "Z1");
        assert_eq!(CellCoord::new(0, 26).to_a1_notation(), "AA1");
        assert_eq!(CellCoord::new(99, 701).to_a1_notation(), "ZZ100");
        assert_eq!(CellCoord::new(0, 702).to_a1_notation(), "AAA1");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(16_383), "XFD");
    }

    // CellSpan のテスト
    #[test]
    fn test_cell_span_new_rejects_inverted() {
        assert!(CellSpan::new(CellCoord::new(5, 0), CellCoord::new(0, 0)).is_none());
        assert!(CellSpan::new(CellCoord::new(0, 5), CellCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_cell_span_contains_and_size() {
        let span = CellSpan::new(CellCoord::new(1, 1), CellCoord::new(10, 5)).unwrap();

        assert!(span.contains(CellCoord::new(1, 1)));
        assert!(span.contains(CellCoord::new(10, 5)));
        assert!(!span.contains(CellCoord::new(0, 1)));
        assert!(!span.contains(CellCoord::new(5, 6)));

        assert_eq!(span.size(), (10, 5));
        assert_eq!(span.rows().count(), 10);
        assert_eq!(span.cols().count(), 5);
        assert_eq!(span.to_a1_notation(), "B2:F11");
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_column_letter_is_uppercase_ascii(col in 0u32..20000) {
                let letters = column_letter(col);
                prop_assert!(!letters.is_empty());
                prop_assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
            }

            #[test]
            fn test_column_letter_is_injective(a in 0u32..5000, b in 0u32..5000) {
                prop_assume!(a != b);
                prop_assert_ne!(column_letter(a), column_letter(b));
            }
        }
    }
}
