//! ビルトインコマンドの実装。
//!
//! ビルトインは fork/exec を経由せずシェルのプロセス内で直接実行される。
//! `try_exec()` が `Some(result)` を返せばビルトインとして処理済み、
//! `None` なら外部コマンドとして executor に委ねる。

use std::env;
use std::path::{Path, PathBuf};

use crate::error::ShellError;

/// ビルトインコマンドの実行を試みる。
///
/// 戻り値:
/// - `Some(Ok(()))` / `Some(Err(_))` — ビルトインとして実行済み
/// - `None` — 該当するビルトインなし（外部コマンドとして実行すべき）
pub fn try_exec(args: &[&str]) -> Option<Result<(), ShellError>> {
    match args.first().copied()? {
        "cd" => Some(builtin_cd(args.get(1).copied())),
        _ => None,
    }
}

/// `cd [dir]` の移動先。引数 → `$HOME` → `/` の順に決める。
pub fn cd_target(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(dir) => PathBuf::from(dir),
        None => env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/")),
    }
}

/// `cd [dir]` — カレントディレクトリを変更する。失敗してもディレクトリは変わらない。
fn builtin_cd(arg: Option<&str>) -> Result<(), ShellError> {
    let target = cd_target(arg);
    env::set_current_dir(Path::new(&target)).map_err(|source| ShellError::ChangeDir {
        path: target.display().to_string(),
        source,
    })?;
    tracing::debug!(dir = %target.display(), "cd");
    Ok(())
}
