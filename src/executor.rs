//! コマンド実行: ビルトイン判定、フォアグラウンド待機、バックグラウンド登録。
//!
//! - [`execute`]: 1 コマンドを実行し、終了ステータスを返す
//! - ビルトイン（`cd`）: fork せずプロセス内で実行
//! - foreground: [`spawn`](crate::spawn::spawn) → [`wait_for_fg`](crate::job::wait_for_fg) で待機
//! - background: ジョブテーブルのロックを保持したまま spawn → `[N] pid` 表示 → 登録

use std::io::{self, Write};

use crate::builtins;
use crate::error::ShellError;
use crate::job::{self, Job, SharedJobs};
use crate::parser::{self, CommandLine};
use crate::shell::Shell;
use crate::spawn;

/// 1 コマンドを実行し、終了ステータスを返す。
///
/// エラーは `msh: ...` として stderr に出し、対応するステータスを返す。シェルは継続する。
pub fn execute(shell: &mut Shell, cmd: &CommandLine<'_>) -> i32 {
    let result = if let Some(result) = builtins::try_exec(&cmd.args) {
        result.map(|()| 0)
    } else if cmd.background {
        // stdout のロックは launch_background がテーブルを取った後の書き込みで取られる。
        launch_background(&shell.jobs, &cmd.args, &mut io::stdout()).map(|_| 0)
    } else {
        launch_foreground(&cmd.args)
    };

    match result {
        Ok(status) => status,
        Err(e) => {
            eprintln!("msh: {}", e);
            e.exit_status()
        }
    }
}

/// フォアグラウンド実行。子の終了を待ってステータスを返す。ジョブは作らない。
pub fn launch_foreground(args: &[&str]) -> Result<i32, ShellError> {
    let pid = spawn::spawn(args)?;
    job::wait_for_fg(pid)
}

/// バックグラウンド実行。待たずに返る。
///
/// fork から登録まで `jobs` のロックを保持するので、その間 reporter は回収できない。
/// 満杯なら fork せずに [`ShellError::CapacityExceeded`] を返す。
///
/// ロック順は reporter と同じ `jobs` → stdout。`out` にロック済みの stdout
/// (`StdoutLock`) を渡すと reporter とデッドロックする。
pub fn launch_background<W>(jobs: &SharedJobs, args: &[&str], out: &mut W) -> Result<Job, ShellError>
where
    W: Write + ?Sized,
{
    let mut table = jobs.lock();
    if table.is_full() {
        return Err(ShellError::CapacityExceeded {
            capacity: table.capacity(),
        });
    }

    let pid = spawn::spawn(args)?;
    let job = Job {
        id: table.next_id(),
        pid,
        command: parser::command_text(args),
    };

    if let Err(e) = writeln!(out, "[{}] {}", job.id, job.pid).and_then(|()| out.flush()) {
        tracing::warn!(error = %e, "failed to write job header");
    }
    table.insert(job.clone())?;
    tracing::debug!(id = job.id, pid = job.pid, "background job registered");
    Ok(job)
}
