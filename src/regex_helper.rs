//! Rewrites for the discriminator dialect.
//!
//! The discriminator runs every definition at once through a `RegexSet`,
//! which has no captures and no backtracking constructs. Pattern fragments
//! written for an extraction backend are rewritten here into an
//! approximation that accepts at least everything the original accepts:
//!
//! - capturing and named groups become `(?:...)`
//! - look-around assertions become the empty group `(?:)`
//! - back-references become a lazy any-text group
//! - atomic groups become plain groups; possessive `+` modifiers are dropped
//!
//! Everything else is copied through untouched.

/// Stand-in for a back-reference: matches any text, including newlines.
const ANY_TEXT: &str = "(?s:.*?)";

/// Quote `text` so it matches itself in discriminator syntax.
pub fn quote_literal(text: &str) -> String {
    regex::escape(text)
}

/// Rewrite an extraction-dialect pattern fragment for the discriminator.
///
/// The result is wrapped in a non-capturing group so that alternation in the
/// fragment cannot bind to neighbouring pieces.
pub fn massage_pattern_for_discriminator(pattern: &str) -> String {
    wrap_fragment(&Rewriter::new(pattern).rewrite())
}

/// Wrap `fragment` in a non-capturing group. A fragment that ends inside a
/// verbose-mode `#` comment gets a trailing newline so the comment cannot
/// swallow the closing parenthesis.
pub fn wrap_fragment(fragment: &str) -> String {
    if ends_in_verbose_comment(fragment) {
        format!("(?:{fragment}\n)")
    } else {
        format!("(?:{fragment})")
    }
}

/// Whether the end of `pattern` lies inside a `#` comment opened while the
/// `x` flag was in effect.
fn ends_in_verbose_comment(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    // verbose flag per open group; the bottom entry is the fragment itself
    let mut verbose = vec![false];
    let mut in_comment = false;
    let mut i = 0;
    while let Some(&ch) = chars.get(i) {
        let current = verbose.last().copied().unwrap_or(false);
        if in_comment {
            in_comment = ch != '\n';
            i += 1;
            continue;
        }
        match ch {
            '\\' => i += 2,
            '[' => i = class_end(&chars, i),
            '#' if current => {
                in_comment = true;
                i += 1;
            }
            '(' if chars.get(i + 1) == Some(&'?') => {
                let mut j = i + 2;
                let mut enable = true;
                let mut x_flag = None;
                while let Some(&c) = chars.get(j) {
                    match c {
                        '-' => enable = false,
                        'x' => x_flag = Some(enable),
                        c if c.is_ascii_alphabetic() => {}
                        _ => break,
                    }
                    j += 1;
                }
                match chars.get(j) {
                    // `(?x)` applies to the rest of the enclosing group
                    Some(')') => {
                        if let (Some(on), Some(top)) = (x_flag, verbose.last_mut()) {
                            *top = on;
                        }
                        i = j + 1;
                    }
                    Some(':') => {
                        verbose.push(x_flag.unwrap_or(current));
                        i = j + 1;
                    }
                    _ => {
                        verbose.push(current);
                        i += 2;
                    }
                }
            }
            '(' => {
                verbose.push(current);
                i += 1;
            }
            ')' => {
                if verbose.len() > 1 {
                    verbose.pop();
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    in_comment
}

/// Names of the named capture groups (`(?P<n>` and `(?<n>`) in `pattern`,
/// in opening order.
pub fn capture_group_names(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut names = Vec::new();
    let mut i = 0;
    while let Some(&ch) = chars.get(i) {
        match ch {
            '\\' => i += 2,
            '[' => i = class_end(&chars, i),
            '(' if chars.get(i + 1) == Some(&'?') => {
                let start = match (chars.get(i + 2), chars.get(i + 3)) {
                    (Some('P'), Some('<')) => i + 4,
                    (Some('<'), Some(c)) if *c != '=' && *c != '!' => i + 3,
                    _ => {
                        i += 2;
                        continue;
                    }
                };
                let end = chars[start..]
                    .iter()
                    .position(|&c| c == '>')
                    .map_or(chars.len(), |n| start + n);
                names.push(chars[start..end].iter().collect());
                i = end + 1;
            }
            _ => i += 1,
        }
    }
    names
}

/// The first back-reference or subroutine call in `pattern` that refers to
/// a group by number (`\1`, `\k<1>`, `\k<-1>`, `\g<2>`, `\g{2}`), if any.
pub fn numbered_group_reference(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while let Some(&ch) = chars.get(i) {
        match ch {
            '[' => i = class_end(&chars, i),
            '\\' => {
                let numeric = |c: Option<&char>| {
                    c.is_some_and(|c| c.is_ascii_digit() || *c == '-' || *c == '+')
                };
                let len = match (chars.get(i + 1), chars.get(i + 2)) {
                    (Some('1'..='9'), _) => 2,
                    (Some('k' | 'g'), Some('<' | '{')) if numeric(chars.get(i + 3)) => {
                        let close = if chars[i + 2] == '<' { '>' } else { '}' };
                        chars[i + 3..]
                            .iter()
                            .position(|&c| c == close)
                            .map_or(chars.len() - i, |n| n + 4)
                    }
                    _ => {
                        i += 2;
                        continue;
                    }
                };
                let end = (i + len).min(chars.len());
                return Some(chars[i..end].iter().collect());
            }
            _ => i += 1,
        }
    }
    None
}

/// Index just past the `]` closing the class that opens at `start`.
fn class_end(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    // a leading `]` is literal
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    let mut depth = 1;
    while let Some(&ch) = chars.get(i) {
        match ch {
            '\\' => i += 2,
            '[' => {
                depth += 1;
                i += 1;
            }
            ']' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    break;
                }
            }
            _ => i += 1,
        }
    }
    i.min(chars.len())
}

struct Rewriter {
    chars: Vec<char>,
    pos: usize,
    out: String,
    /// Previous token was a repetition operator, so a `+` here is possessive.
    after_quantifier: bool,
    /// Inside a `{n,m}` counted repetition.
    in_counted: bool,
}

impl Rewriter {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            out: String::with_capacity(pattern.len()),
            after_quantifier: false,
            in_counted: false,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn emit_current(&mut self) {
        if let Some(ch) = self.peek_at(0) {
            self.out.push(ch);
        }
        self.pos += 1;
    }

    fn rewrite(mut self) -> String {
        while let Some(ch) = self.peek_at(0) {
            match ch {
                '\\' => {
                    self.escape();
                    self.after_quantifier = false;
                }
                '[' => {
                    let end = class_end(&self.chars, self.pos);
                    self.out.extend(&self.chars[self.pos..end]);
                    self.pos = end;
                    self.after_quantifier = false;
                }
                '(' => {
                    self.group();
                    self.after_quantifier = false;
                }
                '{' => {
                    self.in_counted = self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
                    self.emit_current();
                    self.after_quantifier = false;
                }
                '}' => {
                    let closes_repetition = self.in_counted;
                    self.in_counted = false;
                    self.emit_current();
                    self.after_quantifier = closes_repetition;
                }
                '+' if self.after_quantifier => {
                    // possessive: `a++`, `a*+`, `a{2}+`
                    self.pos += 1;
                    self.after_quantifier = false;
                }
                '*' | '+' | '?' => {
                    self.emit_current();
                    self.after_quantifier = true;
                }
                _ => {
                    self.emit_current();
                    self.after_quantifier = false;
                }
            }
        }
        self.out
    }

    fn escape(&mut self) {
        match self.peek_at(1) {
            Some('1'..='9') => {
                self.pos += 2;
                while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                self.out.push_str(ANY_TEXT);
            }
            Some('k') if self.peek_at(2) == Some('<') => {
                self.pos += 3;
                self.skip_past('>');
                self.out.push_str(ANY_TEXT);
            }
            // `\x{41}`, `\u{41}`, `\U{41}`, `\p{L}`, `\P{L}`: the braces are
            // part of the escape, not a counted repetition
            Some('x' | 'u' | 'U' | 'p' | 'P') if self.peek_at(2) == Some('{') => {
                let start = self.pos;
                self.pos += 3;
                self.skip_past('}');
                self.out.extend(&self.chars[start..self.pos]);
            }
            Some(next) => {
                self.out.push('\\');
                self.out.push(next);
                self.pos += 2;
            }
            None => {
                self.out.push('\\');
                self.pos += 1;
            }
        }
    }

    fn group(&mut self) {
        if self.peek_at(1) != Some('?') {
            self.pos += 1;
            self.out.push_str("(?:");
            return;
        }
        match (self.peek_at(2), self.peek_at(3)) {
            (Some(':'), _) | (Some('>'), _) => {
                self.pos += 3;
                self.out.push_str("(?:");
            }
            (Some('=' | '!'), _) | (Some('<'), Some('=' | '!')) => {
                self.pos = self.group_end(self.pos);
                self.out.push_str("(?:)");
            }
            (Some('<'), _) => {
                self.pos += 3;
                self.skip_past('>');
                self.out.push_str("(?:");
            }
            (Some('P'), Some('<')) => {
                self.pos += 4;
                self.skip_past('>');
                self.out.push_str("(?:");
            }
            (Some('P'), Some('=')) => {
                self.pos = self.group_end(self.pos);
                self.out.push_str(ANY_TEXT);
            }
            _ => {
                // flag group such as `(?i)` or `(?x:`; the rest copies through
                self.pos += 2;
                self.out.push_str("(?");
            }
        }
    }

    fn skip_past(&mut self, terminator: char) {
        while let Some(ch) = self.peek_at(0) {
            self.pos += 1;
            if ch == terminator {
                break;
            }
        }
    }

    /// Index just past the `)` closing the group that opens at `start`.
    fn group_end(&self, start: usize) -> usize {
        let mut i = start + 1;
        let mut depth = 1;
        while let Some(&ch) = self.chars.get(i) {
            match ch {
                '\\' => i += 2,
                '[' => i = class_end(&self.chars, i),
                '(' => {
                    depth += 1;
                    i += 1;
                }
                ')' => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => i += 1,
            }
        }
        i.min(self.chars.len())
    }
}
