//! ジョブテーブルと子プロセス待機ヘルパー。
//!
//! フォアグラウンド待機 ([`wait_for_fg`])、バックグラウンド完了の一括回収 ([`drain`])、
//! 子プロセス状態の非ブロッキング確認 ([`ChildProbe`] / [`WaitPid`]) を提供する。
//! [`drain`] は [`reporter`](crate::reporter) のスレッドから呼ばれ、
//! executor は起動時に [`JobTable`] へ登録する。

use std::io::{self, Write};
use std::sync::Arc;

use libc::pid_t;
use parking_lot::Mutex;

use crate::error::ShellError;

// ── データ構造 ───────────────────────────────────────────────────────

/// バックグラウンドジョブ。
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// `[N]` 形式で表示されるジョブ番号。プロセス生存中は再利用しない。
    pub id: usize,
    pub pid: pid_t,
    /// 表示用コマンド文字列（引数を空白 1 つで連結、`&` は含まない）。
    pub command: String,
}

impl Job {
    /// 完了通知行。コマンド文字列が空なら番号だけ。
    pub fn done_line(&self) -> String {
        if self.command.is_empty() {
            format!("[{}]+ Done", self.id)
        } else {
            format!("[{}]+ Done {}", self.id, self.command)
        }
    }
}

// ── JobTable ─────────────────────────────────────────────────────────

/// 容量固定・挿入順のジョブテーブル。
///
/// 削除は後続を左に詰める。[`drain`] が同じ添字を再検査できるよう、穴は作らない。
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
    next_id: usize,
}

/// スレッド間で共有するジョブテーブル。
pub type SharedJobs = Arc<Mutex<JobTable>>;

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn shared(capacity: usize) -> SharedJobs {
        Arc::new(Mutex::new(Self::with_capacity(capacity)))
    }

    /// 次のジョブ番号を払い出す。1 から始まり、呼ぶたびに増える。
    ///
    /// テーブルへの登録成否とは独立している。
    pub fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// 末尾に追加する。満杯なら追加せずに [`ShellError::CapacityExceeded`] を返す。
    pub fn insert(&mut self, job: Job) -> Result<(), ShellError> {
        if self.is_full() {
            return Err(ShellError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        debug_assert!(self.jobs.iter().all(|j| j.pid != job.pid && j.id != job.id));
        self.jobs.push(job);
        Ok(())
    }

    /// `index` のジョブを取り除き、後続を左に詰める。
    pub fn remove_at(&mut self, index: usize) -> Option<Job> {
        if index < self.jobs.len() {
            Some(self.jobs.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 全ジョブのイテレータ（古い順）。
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}

// ── 子プロセス状態の確認 ─────────────────────────────────────────────

/// 非ブロッキング確認の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    /// 終了済み。引数は終了ステータス（シグナル終了なら 128 + シグナル番号）。
    Exited(i32),
}

/// 特定 pid の状態を待たずに確認する。テストでは偽物に差し替える。
pub trait ChildProbe {
    fn try_wait(&mut self, pid: pid_t) -> io::Result<ChildState>;
}

/// `waitpid(pid, WNOHANG)` による実装。
pub struct WaitPid;

impl ChildProbe for WaitPid {
    fn try_wait(&mut self, pid: pid_t) -> io::Result<ChildState> {
        let mut raw_status: i32 = 0;
        let ret = unsafe { libc::waitpid(pid, &mut raw_status, libc::WNOHANG) };
        match ret {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(ChildState::Running),
            _ => Ok(ChildState::Exited(decode_status(raw_status))),
        }
    }
}

/// `waitpid` の raw status を終了ステータスに変換する。
pub fn decode_status(raw_status: i32) -> i32 {
    if libc::WIFEXITED(raw_status) {
        libc::WEXITSTATUS(raw_status)
    } else if libc::WIFSIGNALED(raw_status) {
        128 + libc::WTERMSIG(raw_status)
    } else {
        1
    }
}

// ── 回収 ─────────────────────────────────────────────────────────────

/// テーブル全体を 1 パスで確認し、終了したジョブを通知して取り除く。
///
/// 通知は常にテーブル順（古い順）。取り除いた位置には後続が詰まるので、
/// 添字を進めずに同じ位置を再検査する。戻り値は通知したジョブ数。
///
/// - `ECHILD`: 該当する子がない。ジョブは残して次へ
/// - `EINTR`: 同じジョブを再確認
/// - その他のエラー: `msh: waitpid: ...` を stderr に出し、ジョブは残して次へ
pub fn drain<P, W>(jobs: &mut JobTable, probe: &mut P, out: &mut W) -> usize
where
    P: ChildProbe + ?Sized,
    W: Write + ?Sized,
{
    let mut reported = 0;
    let mut i = 0;
    while let Some(job) = jobs.get(i) {
        match probe.try_wait(job.pid) {
            Ok(ChildState::Running) => i += 1,
            Ok(ChildState::Exited(status)) => {
                tracing::debug!(id = job.id, pid = job.pid, status, "job finished");
                if let Err(e) = writeln!(out, "{}", job.done_line()) {
                    tracing::warn!(error = %e, "failed to write completion line");
                }
                jobs.remove_at(i);
                reported += 1;
            }
            Err(e) if e.raw_os_error() == Some(libc::EINTR) => continue,
            Err(e) if e.raw_os_error() == Some(libc::ECHILD) => {
                tracing::debug!(id = job.id, pid = job.pid, "no such child");
                i += 1;
            }
            Err(e) => {
                eprintln!("msh: waitpid: {}", e);
                i += 1;
            }
        }
    }
    if reported > 0 {
        let _ = out.flush();
    }
    reported
}

// ── 待機ヘルパー ─────────────────────────────────────────────────────

/// フォアグラウンドの子プロセスを待ち、終了ステータスを返す。
///
/// 待つのは `pid` だけ。ジョブテーブル上の子は回収しない。
pub fn wait_for_fg(pid: pid_t) -> Result<i32, ShellError> {
    loop {
        let mut raw_status: i32 = 0;
        let ret = unsafe { libc::waitpid(pid, &mut raw_status, 0) };
        if ret == pid {
            return Ok(decode_status(raw_status));
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(ShellError::Wait { pid, source: err });
    }
}
