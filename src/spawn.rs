//! `fork()` + `execvp()` による外部コマンド起動。
//!
//! exec の失敗は子プロセス側で検出し、診断を stderr に書いてステータス 127 で終了する。
//! 親から見ると通常の終了ステータスと同じ扱いになる。
//!
//! シェルは reporter スレッドを持つマルチスレッドプロセスなので、fork 後の子では
//! async-signal-safe な関数（`execvp`, `write`, `_exit`）しか呼ばない。
//! argv の構築や診断メッセージの整形はすべて fork 前に済ませる。
//!
//! ## 構成
//!
//! | 型 | 役割 |
//! |-----|------|
//! | [`CStringVec`] | argv 用の NULL 終端ポインタ配列 |
//! | [`spawn`] | fork して子で exec する公開関数 |

use std::ffi::CString;
use std::io;

use libc::pid_t;

use crate::error::ShellError;

/// exec に失敗した子プロセスの終了ステータス。
pub const EXEC_FAILURE_STATUS: i32 = 127;

// ── CStringVec ────────────────────────────────────────────────────

/// argv 用の CString ベクタ。NULL 終端のポインタ配列を構築する。
struct CStringVec {
    strings: Vec<CString>,
    ptrs: Vec<*const libc::c_char>,
}

impl CStringVec {
    /// 引数リストから構築する。NUL バイトを含む引数があれば失敗する。
    fn from_args(args: &[&str]) -> io::Result<Self> {
        let strings = args
            .iter()
            .map(|s| CString::new(*s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut ptrs: Vec<*const libc::c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(std::ptr::null()); // NULL 終端
        Ok(Self { strings, ptrs })
    }

    /// `argv[0]`（PATH 検索されるプログラム名）。
    fn program(&self) -> *const libc::c_char {
        self.strings[0].as_ptr()
    }

    fn as_ptr(&self) -> *const *const libc::c_char {
        self.ptrs.as_ptr()
    }
}

// ── spawn 関数 ────────────────────────────────────────────────────

/// 子プロセスを起動して PID を返す。
///
/// - `args`: コマンドと引数（`args[0]` がコマンド名、PATH 検索付き）。環境変数は継承する
///
/// fork 自体の失敗は [`ShellError::Launch`]。exec の失敗は子が 127 で終了する。
pub fn spawn(args: &[&str]) -> Result<pid_t, ShellError> {
    let command = args.first().copied().unwrap_or_default().to_string();
    let launch_error = |source| ShellError::Launch {
        command: command.clone(),
        source,
    };

    if args.is_empty() {
        return Err(launch_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty command",
        )));
    }
    let argv = CStringVec::from_args(args).map_err(launch_error)?;
    let prefix = format!("msh: {}: ", command);

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(launch_error(io::Error::last_os_error())),
        0 => unsafe { exec_child(&argv, prefix.as_bytes()) },
        pid => {
            tracing::debug!(pid, command = %command, "spawned");
            Ok(pid)
        }
    }
}

/// 子プロセス側: exec し、失敗したら診断を書いて 127 で終了する。
///
/// # Safety
///
/// fork 直後の子でのみ呼ぶこと。ここではヒープ確保もロックも行わない。
unsafe fn exec_child(argv: &CStringVec, prefix: &[u8]) -> ! {
    libc::execvp(argv.program(), argv.as_ptr());

    let reason: &[u8] = match io::Error::last_os_error().raw_os_error() {
        Some(libc::ENOENT) => b"command not found\n",
        Some(libc::EACCES) => b"permission denied\n",
        _ => b"exec failed\n",
    };
    write_stderr(prefix);
    write_stderr(reason);
    libc::_exit(EXEC_FAILURE_STATUS)
}

unsafe fn write_stderr(bytes: &[u8]) {
    libc::write(
        libc::STDERR_FILENO,
        bytes.as_ptr() as *const libc::c_void,
        bytes.len(),
    );
}
