use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 空路径的显示形式
pub const ROOT_MARKER: &str = "(root)";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid path `{path}` at offset {offset}: {reason}")]
pub struct PathSyntaxError {
    pub path: String,
    pub offset: usize,
    pub reason: &'static str,
}

impl PathSyntaxError {
    fn new(path: &str, offset: usize, reason: &'static str) -> Self {
        Self {
            path: path.to_string(),
            offset,
            reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl Segment {
    pub fn key(key: impl Into<String>) -> Self {
        Segment::Key(key.into())
    }

    /// 键需要以 `["..."]` 形式输出才能被重新解析；纯数字键加引号以免被当作下标
    fn needs_quotes(key: &str) -> bool {
        key.is_empty()
            || key.contains(&['.', '[', ']'][..])
            || key.chars().all(|c| c.is_ascii_digit())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

/// 解析后的字段路径
///
/// 既用于错误定位，也用于条件规则从输入根节点取值。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn parse(text: &str) -> Result<Self, PathSyntaxError> {
        parse(text)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// 返回追加一段后的新路径，原路径不变
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// 去掉最后一段后的父路径；根路径没有父路径
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        lookup(root, self)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

impl FromStr for PathExpr {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl FromIterator<Segment> for PathExpr {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// 路径开头或 `.` 之后，必须开始一个新段
    SegmentStart,
    InKey,
    InBracket,
    /// `["` 或 `['` 之后；`\` 转义下一个字符
    InQuoted(char),
    QuotedEscape(char),
    /// 引号已闭合，只能接 `]`
    AfterQuote,
    /// 刚闭合 `]`，只能接 `.`、`[` 或结束
    AfterBracket,
}

/// 从左到右扫描路径文本
///
/// 段之间以括号外的 `.` 分隔；`[...]` 中的内容原样保留（可以包含 `.`），
/// 连续的括号段 `[a][b]` 拆成两段。以引号开头的括号段是字符串键，
/// 其中可以出现 `[`、`]`，`\` 转义引号和反斜杠。
pub fn parse(text: &str) -> Result<PathExpr, PathSyntaxError> {
    if text.is_empty() {
        return Err(PathSyntaxError::new(text, 0, "path is empty"));
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut bracket_start = 0;
    let mut state = ScanState::SegmentStart;

    for (offset, ch) in text.char_indices() {
        state = match (state, ch) {
            (ScanState::InQuoted(quote), '\\') => ScanState::QuotedEscape(quote),
            (ScanState::InQuoted(quote), c) if c == quote => ScanState::AfterQuote,
            (ScanState::InQuoted(quote), c) | (ScanState::QuotedEscape(quote), c) => {
                current.push(c);
                ScanState::InQuoted(quote)
            }
            (ScanState::AfterQuote, ']') => {
                segments.push(Segment::Key(std::mem::take(&mut current)));
                ScanState::AfterBracket
            }
            (ScanState::AfterQuote, _) => {
                return Err(PathSyntaxError::new(
                    text,
                    offset,
                    "expected `]` after closing quote",
                ));
            }
            (ScanState::InBracket, '"' | '\'') if current.is_empty() => {
                ScanState::InQuoted(ch)
            }
            (ScanState::InBracket, ']') => {
                if current.is_empty() {
                    return Err(PathSyntaxError::new(text, bracket_start, "empty segment"));
                }
                segments.push(plain_segment(std::mem::take(&mut current)));
                ScanState::AfterBracket
            }
            (ScanState::InBracket, '[') => {
                return Err(PathSyntaxError::new(text, offset, "nested `[`"));
            }
            (ScanState::InBracket, c) => {
                current.push(c);
                ScanState::InBracket
            }
            (ScanState::SegmentStart | ScanState::AfterBracket, '[') => {
                bracket_start = offset;
                ScanState::InBracket
            }
            (ScanState::InKey, '[') => {
                segments.push(plain_segment(std::mem::take(&mut current)));
                bracket_start = offset;
                ScanState::InBracket
            }
            (ScanState::SegmentStart, '.') => {
                return Err(PathSyntaxError::new(text, offset, "empty segment"));
            }
            (ScanState::InKey, '.') => {
                segments.push(plain_segment(std::mem::take(&mut current)));
                ScanState::SegmentStart
            }
            (ScanState::AfterBracket, '.') => ScanState::SegmentStart,
            (_, ']') => {
                return Err(PathSyntaxError::new(text, offset, "unmatched `]`"));
            }
            (ScanState::AfterBracket, _) => {
                return Err(PathSyntaxError::new(
                    text,
                    offset,
                    "expected `.` or `[` after `]`",
                ));
            }
            (ScanState::SegmentStart | ScanState::InKey, c) => {
                current.push(c);
                ScanState::InKey
            }
        };
    }

    match state {
        ScanState::InKey => segments.push(plain_segment(current)),
        ScanState::AfterBracket => {}
        ScanState::InBracket
        | ScanState::InQuoted(_)
        | ScanState::QuotedEscape(_)
        | ScanState::AfterQuote => {
            return Err(PathSyntaxError::new(text, bracket_start, "unclosed `[`"));
        }
        ScanState::SegmentStart => {
            return Err(PathSyntaxError::new(text, text.len(), "empty segment"));
        }
    }

    Ok(PathExpr { segments })
}

fn plain_segment(raw: String) -> Segment {
    match canonical_index(&raw) {
        Some(index) => Segment::Index(index),
        None => Segment::Key(raw),
    }
}

/// 只有规范十进制（`0` 或不以 `0` 开头）才是下标，`007` 仍然是键
fn canonical_index(raw: &str) -> Option<usize> {
    let canonical = !raw.is_empty()
        && raw.chars().all(|c| c.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'));
    if canonical {
        raw.parse().ok()
    } else {
        None
    }
}

/// 按路径依次取值，任何一级缺失都返回 `None`
pub fn lookup<'a>(root: &'a Value, path: &PathExpr) -> Option<&'a Value> {
    path.segments
        .iter()
        .try_fold(root, |current, segment| match (segment, current) {
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Key(key), Value::Array(items)) => {
                canonical_index(key).and_then(|index| items.get(index))
            }
            _ => None,
        })
}

pub fn serialize(path: &PathExpr) -> String {
    if path.segments.is_empty() {
        return ROOT_MARKER.to_string();
    }

    let mut out = String::new();
    for segment in &path.segments {
        match segment {
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
            Segment::Key(key) if Segment::needs_quotes(key) => {
                out.push_str("[\"");
                for c in key.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push_str("\"]");
            }
            Segment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(path: &PathExpr) -> Vec<Segment> {
        path.segments().to_vec()
    }

    #[test]
    fn parses_dotted_and_bracketed_segments() {
        let path = parse("user.address[city.name].zip").unwrap();
        assert_eq!(
            keys(&path),
            vec![
                Segment::key("user"),
                Segment::key("address"),
                Segment::key("city.name"),
                Segment::key("zip"),
            ]
        );
    }

    #[test]
    fn splits_adjacent_bracket_groups() {
        let path = parse("obj[a][b]").unwrap();
        assert_eq!(
            keys(&path),
            vec![Segment::key("obj"), Segment::key("a"), Segment::key("b")]
        );
        let path = parse("obj.[property.sub]").unwrap();
        assert_eq!(
            keys(&path),
            vec![Segment::key("obj"), Segment::key("property.sub")]
        );
    }

    #[test]
    fn digit_segments_become_indices() {
        let path = parse("items[0].tags.1").unwrap();
        assert_eq!(
            keys(&path),
            vec![
                Segment::key("items"),
                Segment::Index(0),
                Segment::key("tags"),
                Segment::Index(1),
            ]
        );
        let quoted = parse("[\"0\"]").unwrap();
        assert_eq!(keys(&quoted), vec![Segment::key("0")]);
    }

    #[test]
    fn leading_zero_digits_stay_keys() {
        let path = parse("codes.007").unwrap();
        assert_eq!(keys(&path), vec![Segment::key("codes"), Segment::key("007")]);
        assert_eq!(path.to_string(), "codes[\"007\"]");
        assert_eq!(keys(&parse("a[00]").unwrap()), vec![Segment::key("a"), Segment::key("00")]);
        assert_eq!(keys(&parse("a.0").unwrap()), vec![Segment::key("a"), Segment::Index(0)]);
    }

    #[test]
    fn quoted_brackets_allow_any_key() {
        let path = parse(r#"m["a]b"]['c[d'][" q\" \\ "]"#).unwrap();
        assert_eq!(
            keys(&path),
            vec![
                Segment::key("m"),
                Segment::key("a]b"),
                Segment::key("c[d"),
                Segment::key(r#" q" \ "#),
            ]
        );
        assert_eq!(parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in [
            "", ".a", "a.", "a..b", "a[b", "a]b", "a[b[c]]", "a[]", "a[b]c", "a[\"b\"c]", "a[\"b]",
        ] {
            assert!(parse(bad).is_err(), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn reports_offset_of_the_defect() {
        let err = parse("a..b").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.reason, "empty segment");
    }

    #[test]
    fn serializes_for_display() {
        assert_eq!(serialize(&PathExpr::root()), "(root)");
        let path = PathExpr::root()
            .child("user")
            .child(2usize)
            .child("first.name")
            .child("x");
        assert_eq!(path.to_string(), "user[2][\"first.name\"].x");
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let root = json!({
            "user": { "roles": ["admin", "dev"], "a.b": 1 },
            "map": { "0": "zero", "007": "bond" }
        });
        let role = parse("user.roles[1]").unwrap();
        assert_eq!(lookup(&root, &role), Some(&json!("dev")));
        let dotted = parse("user[a.b]").unwrap();
        assert_eq!(lookup(&root, &dotted), Some(&json!(1)));
        let numeric_key = parse("map.0").unwrap();
        assert_eq!(lookup(&root, &numeric_key), Some(&json!("zero")));
        let padded = parse("map.007").unwrap();
        assert_eq!(lookup(&root, &padded), Some(&json!("bond")));
        let quoted_index = parse("user.roles[\"0\"]").unwrap();
        assert_eq!(lookup(&root, &quoted_index), Some(&json!("admin")));
        let missing = parse("user.profile.age").unwrap();
        assert_eq!(lookup(&root, &missing), None);
    }

    #[test]
    fn parent_drops_last_segment() {
        let path = PathExpr::root().child("a").child("b");
        assert_eq!(path.parent().unwrap().to_string(), "a");
        assert!(PathExpr::root().parent().is_none());
    }
}
