//! 行入力。任意の [`BufRead`] から 1 行ずつ読み取る。
//!
//! 行は `line_bytes - 1` バイトまで保持し、残りは捨てる（次のコマンドとして
//! 実行はしない）。EOF と読み取りエラーは区別して返す。

use std::io::{self, BufRead, Read};

use crate::error::ShellError;

/// 読み取った 1 行。末尾の改行は含まない。
#[derive(Debug, PartialEq)]
pub struct Line {
    pub text: String,
    /// 上限を超えて切り詰めた場合に `true`。
    pub truncated: bool,
}

pub struct LineReader<R> {
    inner: R,
    max_bytes: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// `line_bytes` は行バッファのサイズ。保持するのは終端分を除いた `line_bytes - 1` バイト。
    pub fn new(inner: R, line_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes: line_bytes.saturating_sub(1).max(1),
            buf: Vec::new(),
        }
    }

    /// 次の 1 行を読む。
    ///
    /// - `Ok(Some(line))` — 1 行読めた
    /// - `Ok(None)` — EOF
    /// - `Err(ShellError::Input)` — 読み取り失敗
    ///
    /// バッファに読むのは上限 + 2 バイト（`\r\n` 分）まで。残りは [`Self::discard_rest`] で捨てる。
    pub fn read_line(&mut self) -> Result<Option<Line>, ShellError> {
        self.buf.clear();
        let limit = self.max_bytes as u64 + 2;
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .map_err(ShellError::Input)?;
        if n == 0 {
            return Ok(None);
        }
        if n as u64 == limit && self.buf.last() != Some(&b'\n') {
            // ここまでで上限を超えているので、捨てた分の有無に関わらず切り詰めになる。
            let skipped = self.discard_rest().map_err(ShellError::Input)?;
            tracing::trace!(skipped, "discarded rest of long line");
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        let mut text = String::from_utf8_lossy(&self.buf).into_owned();
        let truncated = text.len() > self.max_bytes;
        if truncated {
            let mut cut = self.max_bytes;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            tracing::debug!(kept = cut, read = n, "input line truncated");
        }

        Ok(Some(Line { text, truncated }))
    }

    /// 次の改行（含む）まで読み捨てる。捨てたバイト数を返す。
    fn discard_rest(&mut self) -> io::Result<usize> {
        let mut skipped = 0;
        loop {
            let chunk = match self.inner.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if chunk.is_empty() {
                return Ok(skipped);
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.inner.consume(i + 1);
                    return Ok(skipped + i + 1);
                }
                None => {
                    let len = chunk.len();
                    self.inner.consume(len);
                    skipped += len;
                }
            }
        }
    }

    /// 保持できる最大バイト数。
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    fn reader(s: &str, line_bytes: usize) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(s.as_bytes().to_vec()), line_bytes)
    }

    #[test]
    fn reads_lines_then_eof() {
        let mut r = reader("ls -l\nsleep 1 &\n", 100);
        assert_eq!(r.read_line().unwrap().unwrap().text, "ls -l");
        assert_eq!(r.read_line().unwrap().unwrap().text, "sleep 1 &");
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn last_line_without_newline() {
        let mut r = reader("echo hi", 100);
        assert_eq!(r.read_line().unwrap().unwrap().text, "echo hi");
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn empty_line_is_not_eof() {
        let mut r = reader("\n", 100);
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line.text, "");
        assert!(!line.truncated);
    }

    #[test]
    fn long_line_truncated_and_rest_discarded() {
        let long = format!("{}\nnext\n", "a".repeat(150));
        let mut r = reader(&long, 100);
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line.text.len(), 99);
        assert!(line.truncated);
        assert_eq!(r.read_line().unwrap().unwrap().text, "next");
    }

    #[test]
    fn huge_line_is_not_buffered_whole() {
        let huge = format!("{}\nnext\n", "a".repeat(1_000_000));
        let mut r = reader(&huge, 100);
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line.text, "a".repeat(99));
        assert!(line.truncated);
        assert!(r.buf.capacity() < 1024, "buffer grew to {}", r.buf.capacity());
        assert_eq!(r.read_line().unwrap().unwrap().text, "next");
    }

    #[test]
    fn huge_line_at_eof_without_newline() {
        let mut r = reader(&"b".repeat(10_000), 100);
        assert!(r.read_line().unwrap().unwrap().truncated);
        assert_eq!(r.read_line().unwrap(), None);
    }

    #[test]
    fn line_at_bound_with_crlf_is_kept_whole() {
        let mut r = reader(&format!("{}\r\nnext\n", "c".repeat(99)), 100);
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line.text.len(), 99);
        assert!(!line.truncated);
        assert_eq!(r.read_line().unwrap().unwrap().text, "next");
    }

    #[test]
    fn truncation_respects_char_boundary() {
        // "あ" は 3 バイト。上限 4 バイトなら 1 文字だけ残る。
        let mut r = reader("ああ\n", 5);
        let line = r.read_line().unwrap().unwrap();
        assert_eq!(line.text, "あ");
        assert!(line.truncated);
    }

    #[test]
    fn crlf_is_stripped() {
        let mut r = reader("pwd\r\n", 100);
        assert_eq!(r.read_line().unwrap().unwrap().text, "pwd");
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn read_error_is_input_error() {
        let mut r = LineReader::new(io::BufReader::new(Broken), 100);
        assert!(matches!(r.read_line(), Err(ShellError::Input(_))));
    }
}
