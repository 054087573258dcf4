//! Parser Module
//!
//! calamineを使用したワークブックのデコード処理。
//! バイト列を名前付きシートの集合（[`Workbook`]）に変換します。

mod workbook;

pub use workbook::{CalamineDecoder, Sheet, Workbook, WorkbookDecoder};
