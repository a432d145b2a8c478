//! クレート共通のエラー型
//!
//! コア（ティック・アクション）はエラーを返さない設計のため、
//! ここに並ぶのは設定・I/O・コンテンツソースの境界で発生するものだけ。

use thiserror::Error;

/// コンテンツソース（外部コラボレーター）のエラー
///
/// どのバリアントもゲームにとっては非致命的で、バッファは変更されず
/// 次のティックで再取得が試みられる。
#[derive(Error, Debug)]
pub enum ContentSourceError {
    /// HTTP通信エラー
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 正常でないHTTPステータス
    #[error("Content source returned HTTP {status}")]
    Status { status: u16 },

    /// バッチのデコード失敗
    #[error("Failed to decode content batch: {0}")]
    Decode(#[from] serde_json::Error),

    /// 設定されたタイムアウトを超過
    #[error("Content fetch timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// リプレイ用の記録が尽きた
    #[error("Content source exhausted")]
    Exhausted,

    /// コンテンツソースが利用不可
    #[error("Content source unavailable: {0}")]
    Unavailable(String),
}

/// アプリケーション全体のエラー型
#[derive(Error, Debug)]
pub enum LivemodError {
    /// 設定値が不正
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// ファイルI/Oエラー
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML読み込みエラー
    #[error("Failed to parse TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML書き出しエラー
    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON処理エラー
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// コンテンツソースエラー
    #[error(transparent)]
    ContentSource(#[from] ContentSourceError),
}

impl LivemodError {
    /// 設定エラーを作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// 行番号付きJSONエラーを作成
    pub fn json(line: usize, source: serde_json::Error) -> Self {
        Self::Json { line, source }
    }
}

/// クレート共通のResult型
pub type LivemodResult<T> = Result<T, LivemodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LivemodError::configuration("tick interval must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: tick interval must be positive"
        );

        let err = ContentSourceError::Status { status: 503 };
        assert_eq!(err.to_string(), "Content source returned HTTP 503");
    }

    #[test]
    fn test_content_source_error_converts() {
        let err: LivemodError = ContentSourceError::Exhausted.into();
        assert!(matches!(
            err,
            LivemodError::ContentSource(ContentSourceError::Exhausted)
        ));
        assert_eq!(err.to_string(), "Content source exhausted");
    }
}
