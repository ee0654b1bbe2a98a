//! 内部イベント用の `tracing` 初期化。
//!
//! ユーザ向けの診断（`msh: ...`）はログではなく直接 stderr に出す。
//! ここで扱うのは spawn / reap / 切り詰め警告などの内部イベントだけ。

use tracing_subscriber::EnvFilter;

/// 既定のフィルタ。ユーザ向け出力を汚さないよう warn 以上のみ。
const DEFAULT_FILTER: &str = "warn";

/// stderr 向けの fmt サブスクライバをインストールする。
///
/// `filter` が不正なら既定値にフォールバックする。二重初期化は無視する。
pub fn init(filter: Option<&str>) {
    let env_filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
