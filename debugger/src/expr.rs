//! Syntactic screening of expression text before it is sent to the debuggee.
//!
//! This is deliberately not a full parser for the debuggee's source language:
//! the debuggee re-validates everything it is asked to evaluate. The screen
//! catches the inputs that are never worth a round-trip (empty text,
//! unbalanced delimiters, unterminated string literals) and reports every
//! problem it finds rather than stopping at the first.

use std::str::CharIndices;

pub(crate) fn check(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec!["expected an expression".to_string()];
    }

    let mut diagnostics = Vec::new();
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut chars = text.char_indices();

    while let Some((pos, c)) = chars.next() {
        match c {
            '(' | '[' | '{' => open.push((c, pos)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match open.pop() {
                    Some((found, _)) if found == expected => {}
                    Some((found, opened_at)) => diagnostics.push(format!(
                        "mismatched '{c}' at offset {pos}: '{found}' opened at offset {opened_at} is still open"
                    )),
                    None => diagnostics.push(format!("unexpected '{c}' at offset {pos}")),
                }
            }
            '\'' | '"' | '`' => {
                if !consume_string_literal(&mut chars, c) {
                    diagnostics.push(format!(
                        "unterminated string literal starting at offset {pos}"
                    ));
                }
            }
            _ => {}
        }
    }

    for (c, pos) in open {
        diagnostics.push(format!("'{c}' at offset {pos} is never closed"));
    }

    diagnostics
}

// Only template literals may span lines.
fn consume_string_literal(chars: &mut CharIndices<'_>, quote: char) -> bool {
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                let _ = chars.next();
            }
            '\n' if quote != '`' => return false,
            c if c == quote => return true,
            _ => {}
        }
    }
    false
}
