//! 実行時設定。
//!
//! フラグや設定ファイルは持たない。固定の上限値（[`Limits`]）と、
//! 環境変数・端末判定から得られる値だけを [`Config`] にまとめる。

/// ログフィルタを指定する環境変数。未設定なら `RUST_LOG` を参照する。
pub const LOG_ENV: &str = "MSH_LOG";

/// 入力・ジョブテーブルの上限値。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// 1 行あたりの最大トークン数。超過分は警告付きで捨てる。
    pub max_tokens: usize,
    /// 行バッファのバイト数。終端分を除いた `line_bytes - 1` バイトまで保持する。
    pub line_bytes: usize,
    /// 同時に追跡できるバックグラウンドジョブ数。
    pub job_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tokens: 20,
            line_bytes: 100,
            job_capacity: 128,
        }
    }
}

/// シェル起動時に一度だけ構築される設定。
#[derive(Debug, Clone)]
pub struct Config {
    pub limits: Limits,
    /// `tracing` の `EnvFilter` 文字列。`None` なら既定値 `warn`。
    pub log_filter: Option<String>,
    /// stdin が端末ならプロンプトを表示する。
    pub interactive: bool,
}

impl Config {
    /// 環境変数と stdin の状態から設定を組み立てる。
    pub fn from_env() -> Self {
        let log_filter = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) } == 1;
        Self {
            limits: Limits::default(),
            log_filter,
            interactive,
        }
    }
}
