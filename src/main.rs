//! msh — ジョブ制御付きの最小シェル
//!
//! REPLループ: プロンプト表示 → 1 行読み取り → トークン化 → 実行 → ループ
//!
//! バックグラウンドジョブの完了通知は SIGCHLD を受けた reporter スレッドが出力する。
//!
//! ## モジュール構成
//!
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`config`] | 上限値（トークン数、行長、ジョブ数）と環境由来の設定 |
//! | [`input`] | 行入力（行長の上限で切り詰め、EOF と読み取りエラーの区別） |
//! | [`parser`] | トークン化、コメント/空行判定、末尾 `&` の検出と除去 |
//! | [`executor`] | コマンド実行（ビルトイン判定、フォアグラウンド待機、バックグラウンド登録） |
//! | [`builtins`] | ビルトイン（`cd`） |
//! | [`job`] | ジョブテーブル、完了の一括回収、フォアグラウンド待機 |
//! | [`reporter`] | SIGCHLD を受けて回収を行うスレッド |
//! | [`spawn`] | `fork` + `execvp`（exec 失敗時は子が 127 で終了） |
//! | [`shell`] | シェルの状態（終了ステータス、共有ジョブテーブル） |

mod builtins;
mod config;
mod error;
mod executor;
mod input;
mod job;
mod logger;
mod parser;
mod reporter;
mod shell;
mod spawn;

use std::io::{self, Write};

use config::Config;
use input::LineReader;
use shell::Shell;

/// 連続した読み取りエラーの許容回数。
const MAX_READ_FAILURES: u32 = 5;

fn main() {
    let config = Config::from_env();
    logger::init(config.log_filter.as_deref());

    let mut shell = Shell::new(config.limits);

    // reporter が起動できなくてもコマンドは実行できる。完了通知だけが出なくなる。
    let reporter = match reporter::spawn_reporter(shell.jobs.clone()) {
        Ok(r) => Some(r),
        Err(e) => {
            eprintln!("msh: {}", e);
            None
        }
    };

    let stdin = io::stdin();
    let mut reader = LineReader::new(stdin.lock(), config.limits.line_bytes);
    let mut read_failures = 0;

    loop {
        if config.interactive {
            print!("{}", shell.prompt());
            let _ = io::stdout().flush();
        }

        let line = match reader.read_line() {
            Ok(Some(line)) => {
                read_failures = 0;
                line
            }
            // EOF: 正常終了
            Ok(None) => break,
            Err(e) => {
                eprintln!("msh: {}", e);
                read_failures += 1;
                // 連続して失敗し続けるなら回復不能とみなす
                if read_failures >= MAX_READ_FAILURES {
                    std::process::exit(1);
                }
                continue;
            }
        };

        if line.truncated {
            eprintln!(
                "msh: line too long (max {} bytes), truncated",
                reader.max_bytes()
            );
        }

        let Some(cmd) = parser::parse(&line.text, shell.limits.max_tokens) else {
            continue; // 空行・コメント
        };

        if cmd.dropped > 0 {
            eprintln!(
                "msh: too many arguments (max {}), extra ignored",
                shell.limits.max_tokens
            );
            tracing::debug!(dropped = cmd.dropped, "tokens discarded");
        }

        shell.last_status = executor::execute(&mut shell, &cmd);
    }

    if let Some(r) = &reporter {
        r.close();
    }
    if config.interactive {
        println!();
    }
    std::process::exit(0);
}
