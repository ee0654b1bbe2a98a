//! シェルのエラー型。
//!
//! どのエラーもシェル自体を終了させない。REPL は `msh: {err}` を stderr に出して
//! 次の行に進む。例外は [`ShellError::Input`] で、読み取りが回復不能なら
//! ループを抜けて非ゼロで終了する。

use std::io;

use libc::pid_t;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    /// 行の読み取りに失敗した（EOF は含まない）。
    #[error("read: {0}")]
    Input(#[source] io::Error),

    /// 子プロセスを作れなかった。exec の失敗は子側で 127 終了になるのでここには来ない。
    #[error("{command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// フォアグラウンド待機の `waitpid` 自体が失敗した。
    #[error("waitpid {pid}: {source}")]
    Wait {
        pid: pid_t,
        #[source]
        source: io::Error,
    },

    #[error("cd: {path}: {source}")]
    ChangeDir {
        path: String,
        #[source]
        source: io::Error,
    },

    /// ジョブテーブルが満杯。
    #[error("job table full ({capacity} jobs), command not started")]
    CapacityExceeded { capacity: usize },

    /// SIGCHLD の受信登録に失敗した。
    #[error("SIGCHLD: {0}")]
    Signal(#[source] io::Error),

    /// reporter スレッドを起動できなかった。
    #[error("reporter thread: {0}")]
    Thread(#[source] io::Error),
}

impl ShellError {
    /// エラーに対応する終了ステータスを返す。
    /// 127 = command not found, 126 = permission denied, 1 = その他。
    pub fn exit_status(&self) -> i32 {
        match self {
            ShellError::Launch { source, .. } => match source.raw_os_error() {
                Some(libc::ENOENT) => 127,
                Some(libc::EACCES) => 126,
                _ => 1,
            },
            _ => 1,
        }
    }
}
