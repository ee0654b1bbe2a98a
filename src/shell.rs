//! シェルの実行状態を保持するモジュール。
//!
//! ジョブテーブルは [`reporter`](crate::reporter) スレッドと共有するため
//! [`SharedJobs`]（`Arc<Mutex<JobTable>>`）で持つ。
//! 環境変数は `std::env` を直接使用し、子プロセスへの自動継承を活用する。

use crate::config::Limits;
use crate::job::{JobTable, SharedJobs};

/// シェルの実行状態。REPLループ全体で共有される。
pub struct Shell {
    /// 直前のフォアグラウンドコマンドの終了ステータス。プロンプト表示に使う。
    pub last_status: i32,
    /// バックグラウンドジョブのテーブル。reporter スレッドと共有する。
    pub jobs: SharedJobs,
    pub limits: Limits,
}

impl Shell {
    pub fn new(limits: Limits) -> Self {
        Self {
            last_status: 0,
            jobs: JobTable::shared(limits.job_capacity),
            limits,
        }
    }

    /// プロンプト文字列。直前の終了ステータスが非ゼロなら接頭辞に付ける。
    pub fn prompt(&self) -> String {
        if self.last_status == 0 {
            "msh> ".to_string()
        } else {
            format!("[{}] msh> ", self.last_status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_shows_failure_status() {
        let mut shell = Shell::new(Limits::default());
        assert_eq!(shell.prompt(), "msh> ");
        shell.last_status = 127;
        assert_eq!(shell.prompt(), "[127] msh> ");
    }

    #[test]
    fn job_table_uses_configured_capacity() {
        let limits = Limits {
            job_capacity: 3,
            ..Limits::default()
        };
        let shell = Shell::new(limits);
        assert_eq!(shell.jobs.lock().capacity(), 3);
    }
}
