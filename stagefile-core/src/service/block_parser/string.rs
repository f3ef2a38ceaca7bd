use std::str::Chars;

use logos::Lexer;

use super::{LexError, Token};

pub(super) fn unescape<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<String, LexError> {
    let slice = lex.slice();
    unescape_str(&slice[1..slice.len() - 1])
}

fn unescape_str(raw: &str) -> Result<String, LexError> {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let unescaped = match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('"') => '"',
            Some('\\') => '\\',
            Some('u') => unicode_escape(&mut chars, 'u', 4)?,
            Some('U') => unicode_escape(&mut chars, 'U', 8)?,
            Some(other) => return Err(LexError::InvalidEscape(format!("\\{other}"))),
            None => return Err(LexError::InvalidEscape("\\".to_owned())),
        };
        result.push(unescaped);
    }

    Ok(result)
}

fn unicode_escape(chars: &mut Chars, prefix: char, digits: usize) -> Result<char, LexError> {
    let code: String = chars.by_ref().take(digits).collect();
    let invalid = || LexError::InvalidEscape(format!("\\{prefix}{code}"));

    if code.chars().count() != digits || !code.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    u32::from_str_radix(&code, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(invalid)
}
