//! Security Module
//!
//! 入力サイズの制限と、ZIPアーカイブに書き込むエントリ名の検証を提供します。

use crate::error::{Result, XlsxToJsonError};

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力サイズが上限以内かを検証
    pub fn check_input_size(&self, len: usize) -> Result<()> {
        if len as u64 > self.max_input_file_size {
            return Err(XlsxToJsonError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                len, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// アーカイブのエントリ名の検証
///
/// パストラバーサルを防ぐため、エントリ名を検証します。
///
/// # 引数
///
/// * `path` - 検証するエントリ名
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`要素や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> std::result::Result<(), String> {
    // 空のパスは拒否
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:\`やUnix形式の`/`で始まるパス）
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    // `\`を含むパスを拒否（Windows形式のパスセパレータ）
    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    // `..`要素を含むパスを拒否（`a..b.json`のようなファイル名は許可）
    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    Ok(())
}
