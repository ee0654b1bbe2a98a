//! SIGCHLD を受けてバックグラウンドジョブの完了を通知する。
//!
//! シグナルハンドラ内では何もしない。`signal_hook::iterator::Signals` が受信を記録し、
//! 専用スレッドがそれを通常のコードとして受け取って [`job::drain`](crate::job::drain) を実行する。
//! テーブル操作・整形・出力はすべてこのスレッド上で、ジョブテーブルのロックを取って行う。
//!
//! executor はバックグラウンド起動の fork から登録までロックを保持する。
//! そのため起動直後に終了した子も、登録後の drain で必ず拾われる。

use std::io;
use std::thread;

use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::{Handle, Signals};

use crate::error::ShellError;
use crate::job::{self, SharedJobs, WaitPid};

/// 起動済みの reporter。drop してもスレッドは止めない（シェル終了まで動く）。
pub struct Reporter {
    handle: Handle,
}

impl Reporter {
    /// 受信ループを閉じてスレッドを終了させる。
    pub fn close(&self) {
        self.handle.close();
    }
}

/// SIGCHLD の受信を登録し、回収スレッドを起動する。
pub fn spawn_reporter(jobs: SharedJobs) -> Result<Reporter, ShellError> {
    let mut signals = Signals::new([SIGCHLD]).map_err(ShellError::Signal)?;
    let handle = signals.handle();

    thread::Builder::new()
        .name("msh-reporter".into())
        .spawn(move || {
            for _ in signals.forever() {
                let mut table = jobs.lock();
                if table.is_empty() {
                    continue;
                }
                let stdout = io::stdout();
                let mut out = stdout.lock();
                let n = job::drain(&mut table, &mut WaitPid, &mut out);
                tracing::trace!(reported = n, remaining = table.len(), "drained");
            }
        })
        .map_err(ShellError::Thread)?;

    Ok(Reporter { handle })
}
