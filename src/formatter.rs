//! Formatter Module
//!
//! デコードされたセル値をレコードのスカラー値に変換するモジュール。
//! 数値・文字列・論理値はそのまま保持し、日付・エラー値は文字列に変換します。

use std::fmt::Write as _;

use calamine::Data;
use log::debug;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::api::DateFormat;
use crate::error::{Result, XlsxToJsonError};
use crate::types::CellValue;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// セルフォーマッター
///
/// calamineのセル値を[`CellValue`]に変換するファサードとして機能します。
#[derive(Debug, Clone, Default)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new(date_format: DateFormat) -> Self {
        Self {
            date_formatter: DateFormatter { date_format },
        }
    }

    /// セル値を変換
    ///
    /// # 引数
    ///
    /// * `cell` - calamineのセルデータ
    ///
    /// # 戻り値
    ///
    /// 変換後の値。日付として表せないシリアル値は数値のまま返します。
    pub fn format_cell(&self, cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                if dt.is_duration() {
                    CellValue::String(self.date_formatter.format_duration(serial))
                } else {
                    match self.date_formatter.format(serial) {
                        Ok(text) => CellValue::String(text),
                        // 日付として表せないシリアル値は数値のまま残す
                        Err(e) => {
                            debug!("keeping date cell as number: {}", e);
                            CellValue::Number(serial)
                        }
                    }
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
            // 例: #DIV/0!
            Data::Error(e) => CellValue::String(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。常に1900年エポックとして処理します。
#[derive(Debug, Clone, Default)]
pub(crate) struct DateFormatter {
    date_format: DateFormat,
}

impl DateFormatter {
    /// シリアル日付値をフォーマット
    ///
    /// # エポックシステム
    ///
    /// - シリアル値1 = 1900年1月1日
    /// - Excelの1900年うるう年バグにより、シリアル値60は存在しない1900年2月29日を指す
    ///   （1900年2月28日として出力します）
    /// - シリアル値61以降は1899年12月30日起算
    pub fn format(&self, serial_value: f64) -> Result<String> {
        let datetime = serial_to_datetime(serial_value)?;
        let has_time = serial_value.fract() != 0.0;

        let mut formatted = String::new();
        let written = match &self.date_format {
            DateFormat::Iso8601 if serial_value < 1.0 => {
                write!(formatted, "{}", datetime.format("%H:%M:%S"))
            }
            DateFormat::Iso8601 if has_time => {
                write!(formatted, "{}", datetime.format("%Y-%m-%dT%H:%M:%S"))
            }
            DateFormat::Iso8601 => write!(formatted, "{}", datetime.format("%Y-%m-%d")),
            DateFormat::Custom(format_str) => write!(formatted, "{}", datetime.format(format_str)),
        };

        written.map_err(|_| {
            XlsxToJsonError::Config(format!("Invalid date format string: {:?}", self.date_format))
        })?;

        Ok(formatted)
    }

    /// 経過時間を`[h]:mm:ss`形式でフォーマット
    pub fn format_duration(&self, serial_value: f64) -> String {
        let total = (serial_value * SECONDS_PER_DAY).round() as i64;
        let sign = if total < 0 { "-" } else { "" };
        let total = total.unsigned_abs();
        format!(
            "{}{}:{:02}:{:02}",
            sign,
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}

/// シリアル値を日時に変換
fn serial_to_datetime(serial_value: f64) -> Result<NaiveDateTime> {
    let overflow = || {
        XlsxToJsonError::Config(format!(
            "Date calculation overflow: serial_value={}",
            serial_value
        ))
    };

    if !serial_value.is_finite() || serial_value < 0.0 {
        return Err(overflow());
    }

    let days = serial_value.floor() as i64;
    let seconds = ((serial_value - days as f64) * SECONDS_PER_DAY).round() as i64;

    // シリアル値60以前はうるう年バグの影響を受けないよう1899-12-31起算
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    }
    .ok_or_else(overflow)?;
    let days = if days == 60 { 59 } else { days };

    epoch
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(Duration::try_days(days)?))
        .and_then(|date| date.checked_add_signed(Duration::try_seconds(seconds)?))
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    fn iso() -> DateFormatter {
        DateFormatter {
            date_format: DateFormat::Iso8601,
        }
    }

    #[test]
    fn test_format_scalar_cells() {
        let formatter = CellFormatter::default();

        assert_eq!(
            formatter.format_cell(&Data::Int(42)),
            CellValue::Number(42.0)
        );
        assert_eq!(
            formatter.format_cell(&Data::Float(1.5)),
            CellValue::Number(1.5)
        );
        assert_eq!(
            formatter.format_cell(&Data::String("Ann".to_string())),
            CellValue::String("Ann".to_string())
        );
        assert_eq!(
            formatter.format_cell(&Data::Bool(true)),
            CellValue::Bool(true)
        );
        assert_eq!(formatter.format_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_format_error_cell() {
        let formatter = CellFormatter::default();
        let value = formatter.format_cell(&Data::Error(CellErrorType::Div0));
        assert_eq!(value, CellValue::String("#DIV/0!".to_string()));
    }

    #[test]
    fn test_format_datetime_cell() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let dt = ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            formatter.format_cell(&Data::DateTime(dt)),
            CellValue::String("2023-03-15".to_string())
        );
    }

    #[test]
    fn test_format_duration_cell() {
        let formatter = CellFormatter::default();
        let dt = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(
            formatter.format_cell(&Data::DateTime(dt)),
            CellValue::String("36:00:00".to_string())
        );
    }

    #[test]
    fn test_unrepresentable_date_stays_number() {
        let formatter = CellFormatter::default();
        let dt = ExcelDateTime::new(-5.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            formatter.format_cell(&Data::DateTime(dt)),
            CellValue::Number(-5.0)
        );

        let dt = ExcelDateTime::new(1.0e12, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            formatter.format_cell(&Data::DateTime(dt)),
            CellValue::Number(1.0e12)
        );
    }

    #[test]
    fn test_duration_extremes() {
        let formatter = iso();
        assert_eq!(formatter.format_duration(-0.5), "-12:00:00");
        assert!(formatter.format_duration(f64::MIN).starts_with('-'));
    }

    #[test]
    fn test_epoch_boundaries() {
        let formatter = iso();
        assert_eq!(formatter.format(1.0).unwrap(), "1900-01-01");
        assert_eq!(formatter.format(59.0).unwrap(), "1900-02-28");
        assert_eq!(formatter.format(61.0).unwrap(), "1900-03-01");
        assert_eq!(formatter.format(43831.0).unwrap(), "2020-01-01");
    }

    #[test]
    fn test_date_with_time() {
        let formatter = iso();
        assert_eq!(formatter.format(43831.5).unwrap(), "2020-01-01T12:00:00");
        assert_eq!(formatter.format(0.25).unwrap(), "06:00:00");
    }

    #[test]
    fn test_custom_format() {
        let formatter = DateFormatter {
            date_format: DateFormat::Custom("%Y/%m/%d".to_string()),
        };
        assert_eq!(formatter.format(43831.0).unwrap(), "2020/01/01");
    }

    #[test]
    fn test_negative_serial_is_error() {
        assert!(iso().format(-1.0).is_err());
    }
}
