//! Window Module
//!
//! レコード列に対する行範囲（1始まり・両端を含む）の検証とクランプを提供するモジュール。
//!
//! クランプ規則:
//!
//! - `start' = max(1, min(start, N))`
//! - `end' = max(start', min(end, N))`
//! - `N == 0` の場合は空のウィンドウ
//!
//! `end' >= start'` を保証するため、`(5, 3)` のような逆転した要求は
//! `(5, 5)` になります（`(3, 3)`や空ではありません）。

use log::debug;

/// プレビューで表示する最大行数のデフォルト値
pub const PREVIEW_ROW_LIMIT: usize = 10;

/// 要求された行範囲（1始まり・両端を含む）
///
/// 値は検証前の要求であり、`start == 0` や `start > end` も受け付けます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// 新しい範囲を生成
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// レコード列全体の範囲 `(1, N)`
    pub fn full(count: usize) -> Self {
        Self::new(1, count)
    }

    /// レコード数`count`に対してクランプする
    pub fn clamp(self, count: usize) -> RowWindow {
        if count == 0 {
            return RowWindow::Empty;
        }

        let start = self.start.min(count).max(1);
        let end = self.end.min(count).max(start);

        if (start, end) != (self.start, self.end) {
            debug!(
                "clamped row range ({}, {}) to ({}, {}) for {} records",
                self.start, self.end, start, end, count
            );
        }

        RowWindow::Rows(RowRange { start, end })
    }

    /// 行数
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// 範囲が空かどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// クランプ済みの有効な行範囲
///
/// `Rows`の場合は常に `1 <= start <= end <= N` を満たします。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowWindow {
    /// 空のウィンドウ（エラーではありません）
    #[default]
    Empty,

    /// 有効な行範囲
    Rows(RowRange),
}

impl RowWindow {
    /// 要求をクランプしてウィンドウを生成
    pub fn select(requested: RowRange, count: usize) -> Self {
        requested.clamp(count)
    }

    /// 再クランプ（クランプ済みのウィンドウに対しては何も変わりません）
    pub fn clamp(self, count: usize) -> Self {
        match self {
            RowWindow::Empty => RowWindow::Empty,
            RowWindow::Rows(range) => range.clamp(count),
        }
    }

    /// 行数
    pub fn len(&self) -> usize {
        match self {
            RowWindow::Empty => 0,
            RowWindow::Rows(range) => range.len(),
        }
    }

    /// ウィンドウが空かどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1始まりの範囲（空の場合は`None`）
    pub fn range(&self) -> Option<RowRange> {
        match self {
            RowWindow::Empty => None,
            RowWindow::Rows(range) => Some(*range),
        }
    }

    /// 0始まり・半開区間 `[start-1, end)` に変換
    pub fn to_slice_bounds(&self) -> std::ops::Range<usize> {
        match self {
            RowWindow::Empty => 0..0,
            RowWindow::Rows(range) => (range.start - 1)..range.end,
        }
    }

    /// ウィンドウ内の要素を切り出す
    ///
    /// ウィンドウがスライスの長さを超える場合は、長さに合わせて切り詰めます。
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let bounds = self.to_slice_bounds();
        let end = bounds.end.min(items.len());
        let start = bounds.start.min(end);
        &items[start..end]
    }

    /// プレビュー用のウィンドウ
    ///
    /// ウィンドウの先頭から最大`cap`行に制限します。
    /// エクスポートは常に元のウィンドウ全体を使用します。
    pub fn preview(&self, cap: usize) -> Self {
        match self {
            RowWindow::Rows(range) if cap > 0 => RowWindow::Rows(RowRange {
                start: range.start,
                end: range.end.min(range.start.saturating_add(cap - 1)),
            }),
            _ => RowWindow::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_within_bounds() {
        assert_eq!(
            RowRange::new(2, 4).clamp(10),
            RowWindow::Rows(RowRange::new(2, 4))
        );
    }

    #[test]
    fn test_clamp_end_exceeds_count() {
        assert_eq!(
            RowRange::new(3, 100).clamp(10),
            RowWindow::Rows(RowRange::new(3, 10))
        );
    }

    #[test]
    fn test_clamp_inverted_range_ties_to_start() {
        // end' = max(start', min(end, N))
        assert_eq!(
            RowRange::new(5, 3).clamp(10),
            RowWindow::Rows(RowRange::new(5, 5))
        );
    }

    #[test]
    fn test_clamp_zero_start() {
        assert_eq!(
            RowRange::new(0, 0).clamp(10),
            RowWindow::Rows(RowRange::new(1, 1))
        );
    }

    #[test]
    fn test_clamp_start_beyond_count() {
        assert_eq!(
            RowRange::new(50, 60).clamp(10),
            RowWindow::Rows(RowRange::new(10, 10))
        );
    }

    #[test]
    fn test_clamp_empty_sequence() {
        assert_eq!(RowRange::new(1, 10).clamp(0), RowWindow::Empty);
        assert!(RowRange::full(0).clamp(0).is_empty());
    }

    #[test]
    fn test_slice_bounds() {
        let window = RowRange::new(2, 4).clamp(10);
        assert_eq!(window.to_slice_bounds(), 1..4);
        assert_eq!(window.len(), 3);

        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(window.slice(&items), &[2, 3, 4]);
        assert_eq!(RowWindow::Empty.slice(&items), &[] as &[u32]);
    }

    #[test]
    fn test_preview_caps_rows() {
        let window = RowRange::full(500).clamp(500);
        assert_eq!(
            window.preview(PREVIEW_ROW_LIMIT),
            RowWindow::Rows(RowRange::new(1, 10))
        );

        let window = RowRange::new(495, 500).clamp(500);
        assert_eq!(window.preview(PREVIEW_ROW_LIMIT), window);

        assert_eq!(RowWindow::Empty.preview(PREVIEW_ROW_LIMIT), RowWindow::Empty);
        assert_eq!(window.preview(0), RowWindow::Empty);
    }

    #[test]
    fn test_preview_with_unbounded_cap() {
        let window = RowRange::new(3, 5).clamp(10);
        assert_eq!(window.preview(usize::MAX), window);
    }

    #[test]
    fn test_row_range_len() {
        assert_eq!(RowRange::new(3, 5).len(), 3);
        assert_eq!(RowRange::new(5, 3).len(), 0);
        assert!(RowRange::new(5, 3).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_clamp_is_idempotent(start in 0usize..200, end in 0usize..200, count in 0usize..150) {
                let once = RowRange::new(start, end).clamp(count);
                prop_assert_eq!(once.clamp(count), once);
            }

            #[test]
            fn test_clamp_bounds(start in 0usize..200, end in 0usize..200, count in 0usize..150) {
                match RowRange::new(start, end).clamp(count) {
                    RowWindow::Empty => prop_assert_eq!(count, 0),
                    RowWindow::Rows(range) => {
                        prop_assert!(1 <= range.start);
                        prop_assert!(range.start <= range.end);
                        prop_assert!(range.end <= count);
                    }
                }
            }

            #[test]
            fn test_preview_within_window(start in 0usize..200, end in 0usize..200, count in 1usize..150, cap in 1usize..20) {
                let window = RowRange::new(start, end).clamp(count);
                let preview = window.preview(cap);
                prop_assert!(preview.len() <= cap);
                prop_assert!(preview.len() <= window.len());
                prop_assert_eq!(preview.range().map(|r| r.start), window.range().map(|r| r.start));
            }
        }
    }
}
