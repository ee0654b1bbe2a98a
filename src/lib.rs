//! msh ライブラリ — ベンチマーク・テスト用にモジュールを公開する。
//!
//! バイナリ本体は `main.rs` の REPL ループ。
//! この `lib.rs` は `benches/bench_main.rs` 等の外部クレートから
//! パーサー・ジョブテーブル・回収処理に直接アクセスするために存在する。
//!
//! ## モジュール構成
//!
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`config`] | 上限値（トークン数、行長、ジョブ数）と環境由来の設定 |
//! | [`error`] | エラー型 [`ShellError`](error::ShellError) |
//! | [`logger`] | `tracing` サブスクライバの初期化 |
//! | [`input`] | 行入力（行長の上限で切り詰め） |
//! | [`parser`] | トークン化、末尾 `&` の検出と除去 |
//! | [`executor`] | コマンド実行（ビルトイン判定、フォアグラウンド待機、バックグラウンド登録） |
//! | [`builtins`] | ビルトイン（`cd`） |
//! | [`job`] | ジョブテーブル、完了の一括回収 |
//! | [`reporter`] | SIGCHLD を受けて回収を行うスレッド |
//! | [`shell`] | シェルの状態 |
//! | [`spawn`] | `fork` + `execvp` ラッパー |

pub mod builtins;
pub mod config;
pub mod error;
pub mod executor;
pub mod input;
pub mod job;
pub mod logger;
pub mod parser;
pub mod reporter;
pub mod shell;
pub mod spawn;
