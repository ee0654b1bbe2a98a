//! トークナイザ + バックグラウンド判定: 入力 1 行から引数ベクタを作る。
//!
//! 空白（スペース・タブ・改行）で区切るだけの単純な分割で、クォートや変数展開は扱わない。
//! トークンは入力行のスライス（ゼロコピー）として保持する。
//!
//! ## 対応構文
//!
//! - コメント行: 最初の非空白文字が `#`
//! - バックグラウンド実行: `cmd &`（独立トークン）/ `cmd&`（末尾トークンに連結）

// ── データ構造 ─────────────────────────────────────────────────────

/// バックグラウンド実行マーカー。
pub const BACKGROUND_MARKER: char = '&';

/// トークン列。上限を超えて捨てたトークン数も持つ。
#[derive(Debug, PartialEq)]
pub struct Tokens<'a> {
    pub words: Vec<&'a str>,
    /// 上限超過で捨てたトークン数。0 なら切り詰めなし。
    pub dropped: usize,
}

/// 実行可能な 1 コマンド。`args[0]` がプログラム名。
#[derive(Debug, PartialEq)]
pub struct CommandLine<'a> {
    pub args: Vec<&'a str>,
    /// 末尾に `&` があった場合に `true`。`args` からは除去済み。
    pub background: bool,
    /// 上限超過で捨てたトークン数。
    pub dropped: usize,
}

// ── トークナイザ ───────────────────────────────────────────────────

/// 空行・空白のみの行・コメント行なら `true`。
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// 行を空白で分割する。最大 `max_tokens` 個まで、残りは数だけ数えて捨てる。
pub fn tokenize(line: &str, max_tokens: usize) -> Tokens<'_> {
    let mut words = Vec::with_capacity(max_tokens.min(16));
    let mut dropped = 0;
    for word in line.split_ascii_whitespace() {
        if words.len() < max_tokens {
            words.push(word);
        } else {
            dropped += 1;
        }
    }
    Tokens { words, dropped }
}

// ── バックグラウンド判定 ───────────────────────────────────────────

/// 末尾の `&` を検出して取り除く。検出したら `true`。
///
/// - `["sleep", "1", "&"]` → `["sleep", "1"]`
/// - `["sleep", "1&"]` → `["sleep", "1"]`
/// - `["&"]` → `[]`
pub fn detect_background(words: &mut Vec<&str>) -> bool {
    let Some(&last) = words.last() else {
        return false;
    };
    let Some(stripped) = last.strip_suffix(BACKGROUND_MARKER) else {
        return false;
    };
    words.pop();
    if !stripped.is_empty() {
        words.push(stripped);
    }
    true
}

/// トークン化とバックグラウンド判定をまとめて行う。
///
/// 実行するものがなければ `None`（空行、コメント、`&` だけの行）。
pub fn parse(line: &str, max_tokens: usize) -> Option<CommandLine<'_>> {
    if is_blank_or_comment(line) {
        return None;
    }
    let Tokens { mut words, dropped } = tokenize(line, max_tokens);
    let background = detect_background(&mut words);
    if words.is_empty() {
        return None;
    }
    Some(CommandLine {
        args: words,
        background,
        dropped,
    })
}

/// 表示用コマンド文字列。引数を空白 1 つで連結する（`&` は含まない）。
pub fn command_text(args: &[&str]) -> String {
    args.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<&str> {
        tokenize(line, 20).words
    }

    // ── トークナイザ ──

    #[test]
    fn splits_on_spaces_tabs_newlines() {
        assert_eq!(words("ls\t-l  /tmp\n"), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn blank_and_comment_lines() {
        assert!(is_blank_or_comment(""));
        assert!(is_blank_or_comment("   \t"));
        assert!(is_blank_or_comment("# foo"));
        assert!(is_blank_or_comment("   # indented"));
        assert!(!is_blank_or_comment("echo # not a comment"));
    }

    #[test]
    fn token_count_is_bounded() {
        let line = (0..25).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let t = tokenize(&line, 20);
        assert_eq!(t.words.len(), 20);
        assert_eq!(t.dropped, 5);
        assert_eq!(t.words[19], "19");
    }

    #[test]
    fn exactly_max_tokens_drops_nothing() {
        let line = vec!["x"; 20].join(" ");
        assert_eq!(tokenize(&line, 20).dropped, 0);
    }

    // ── バックグラウンド判定 ──

    #[test]
    fn standalone_marker() {
        let mut w = words("sleep 1 &");
        assert!(detect_background(&mut w));
        assert_eq!(w, vec!["sleep", "1"]);
    }

    #[test]
    fn suffixed_marker() {
        let mut w = words("sleep 1&");
        assert!(detect_background(&mut w));
        assert_eq!(w, vec!["sleep", "1"]);
    }

    #[test]
    fn lone_marker_removes_token() {
        let mut w = words("&");
        assert!(detect_background(&mut w));
        assert!(w.is_empty());
    }

    #[test]
    fn no_marker() {
        let mut w = words("echo a&b");
        assert!(!detect_background(&mut w));
        assert_eq!(w, vec!["echo", "a&b"]);
    }

    #[test]
    fn only_one_marker_is_stripped() {
        let mut w = words("echo x&&");
        assert!(detect_background(&mut w));
        assert_eq!(w, vec!["echo", "x&"]);
    }

    #[test]
    fn empty_is_noop() {
        let mut w: Vec<&str> = Vec::new();
        assert!(!detect_background(&mut w));
    }

    // ── parse ──

    #[test]
    fn parse_foreground() {
        let c = parse("ls -l", 20).unwrap();
        assert_eq!(c.args, vec!["ls", "-l"]);
        assert!(!c.background);
    }

    #[test]
    fn parse_background() {
        let c = parse("sleep 1&", 20).unwrap();
        assert_eq!(c.args, vec!["sleep", "1"]);
        assert!(c.background);
        assert_eq!(command_text(&c.args), "sleep 1");
    }

    #[test]
    fn parse_nothing_to_execute() {
        assert_eq!(parse("", 20), None);
        assert_eq!(parse("  \t ", 20), None);
        assert_eq!(parse("# sleep 1 &", 20), None);
        assert_eq!(parse(" & ", 20), None);
    }

    #[test]
    fn marker_past_limit_is_lost() {
        let line = format!("{} &", vec!["a"; 20].join(" "));
        let c = parse(&line, 20).unwrap();
        assert!(!c.background);
        assert_eq!(c.dropped, 1);
    }
}
