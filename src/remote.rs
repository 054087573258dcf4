//! Remote Fetcher
//!
//! 共有スプレッドシートのURLからドキュメントIDを抽出し、
//! xlsx形式のエクスポートURLからワークブックのバイト列を取得します。
//!
//! 取得処理は[`ByteSource`]トレイトで抽象化されており、
//! テストやオフライン環境では任意の実装に差し替えられます。

use once_cell::sync::Lazy;
use regex::Regex;

use log::info;

use crate::error::{Result, XlsxToJsonError};
use crate::parser::{Workbook, WorkbookDecoder};

static DOCUMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("Hardcode regex pattern"));

/// URLからドキュメントIDを抽出
///
/// # 戻り値
///
/// * `Ok(String)` - `/d/<id>` の`<id>`部分
/// * `Err(XlsxToJsonError::InvalidReference)` - `/d/<id>` を含まない場合
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::extract_document_id;
///
/// let id = extract_document_id("https://docs.google.com/spreadsheets/d/ABC123/edit#gid=0").unwrap();
/// assert_eq!(id, "ABC123");
/// assert!(extract_document_id("https://example.com/sheet").is_err());
/// ```
pub fn extract_document_id(url: &str) -> Result<String> {
    DOCUMENT_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| XlsxToJsonError::InvalidReference(url.to_string()))
}

/// ドキュメントIDからxlsxエクスポートURLを生成
pub fn export_url(document_id: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=xlsx",
        document_id
    )
}

/// バイト列の取得元
pub trait ByteSource {
    /// URLの内容を取得
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTPによる取得元（reqwestのブロッキングクライアント）
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpByteSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl HttpByteSource {
    /// デフォルト設定のクライアントで生成
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("xlsxjson/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| XlsxToJsonError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// 既存のクライアントを使用して生成
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "remote")]
impl ByteSource for HttpByteSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| XlsxToJsonError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(XlsxToJsonError::Network(format!(
                "unexpected status {} from {}",
                status, url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| XlsxToJsonError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// リモートのワークブック取得
pub struct RemoteSheetFetcher<'a> {
    source: &'a dyn ByteSource,
}

impl<'a> RemoteSheetFetcher<'a> {
    pub fn new(source: &'a dyn ByteSource) -> Self {
        Self { source }
    }

    /// URLからワークブックのバイト列を取得
    ///
    /// URLが不正な場合は取得を行いません。
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let id = extract_document_id(url)?;
        let bytes = self.source.fetch(&export_url(&id))?;
        info!("fetched document {} ({} bytes)", id, bytes.len());
        Ok(bytes)
    }

    /// URLからワークブックを取得してデコード
    pub fn fetch_workbook(&self, url: &str, decoder: &dyn WorkbookDecoder) -> Result<Workbook> {
        let bytes = self.fetch_bytes(url)?;
        decoder.decode(&bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 呼び出しを記録する取得元
    pub(crate) struct RecordingSource {
        pub(crate) response: Result<Vec<u8>>,
        pub(crate) calls: RefCell<Vec<String>>,
    }

    impl RecordingSource {
        pub(crate) fn ok(bytes: Vec<u8>) -> Self {
            Self {
                response: Ok(bytes),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                response: Err(XlsxToJsonError::Network(message.to_string())),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ByteSource for RecordingSource {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(url.to_string());
            match &self.response {
                Ok(bytes) => Ok(bytes.clone()),
                Err(e) => Err(XlsxToJsonError::Network(e.to_string())),
            }
        }
    }

    #[test]
    fn test_extract_document_id() {
        assert_eq!(
            extract_document_id("https://docs.google.com/spreadsheets/d/ABC123/edit").unwrap(),
            "ABC123"
        );
        assert_eq!(
            extract_document_id("https://docs.google.com/spreadsheets/d/a-b_C9/view?x=1").unwrap(),
            "a-b_C9"
        );
    }

    #[test]
    fn test_extract_document_id_invalid() {
        for url in ["", "https://example.com", "https://example.com/d/", "/x/ABC"] {
            assert!(matches!(
                extract_document_id(url),
                Err(XlsxToJsonError::InvalidReference(_))
            ));
        }
    }

    #[test]
    fn test_export_url() {
        assert_eq!(
            export_url("ABC123"),
            "https://docs.google.com/spreadsheets/d/ABC123/export?format=xlsx"
        );
    }

    #[test]
    fn test_invalid_url_never_fetches() {
        let source = RecordingSource::ok(Vec::new());
        let result = RemoteSheetFetcher::new(&source).fetch_bytes("not a sheet url");

        assert!(matches!(result, Err(XlsxToJsonError::InvalidReference(_))));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_fetch_uses_export_url() {
        let source = RecordingSource::ok(vec![1, 2, 3]);
        let bytes = RemoteSheetFetcher::new(&source)
            .fetch_bytes("https://docs.google.com/spreadsheets/d/ABC123/edit")
            .unwrap();

        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(
            *source.calls.borrow(),
            vec!["https://docs.google.com/spreadsheets/d/ABC123/export?format=xlsx".to_string()]
        );
    }

    #[test]
    fn test_fetch_failure_is_network_error() {
        let source = RecordingSource::failing("connection refused");
        let result =
            RemoteSheetFetcher::new(&source).fetch_bytes("https://docs.google.com/spreadsheets/d/X/");
        assert!(matches!(result, Err(XlsxToJsonError::Network(_))));
        assert_eq!(source.calls.borrow().len(), 1);
    }
}
