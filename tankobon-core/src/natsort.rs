//! Natural ordering for file and entry names: digit runs compare by value,
//! so `page10` sorts after `page9` instead of after `page1`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn tokenize(s: &str) -> impl Iterator<Item = Token<'_>> {
    let bytes = s.as_bytes();
    let mut start = 0;

    std::iter::from_fn(move || {
        if start >= bytes.len() {
            return None;
        }
        let is_digit = bytes[start].is_ascii_digit();
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() == is_digit {
            end += 1;
        }
        let token = &s[start..end];
        start = end;
        Some(if is_digit {
            Token::Number(token)
        } else {
            Token::Text(token)
        })
    })
}

fn cmp_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Equal-length digit strings compare correctly lexicographically, longer
    // strings hold larger values. Avoids overflow on absurdly long digit runs.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().flat_map(char::to_lowercase);
    let mut b_chars = b.chars().flat_map(char::to_lowercase);

    loop {
        match (a_chars.next(), b_chars.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => match a.cmp(&b) {
                Ordering::Equal => {}
                other => return other,
            },
        }
    }
}

/// Compares two names naturally, numeric runs by value and text case-insensitively.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_tokens = tokenize(a);
    let mut b_tokens = tokenize(b);

    loop {
        match (a_tokens.next(), b_tokens.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => {
                let ordering = match (a, b) {
                    (Token::Number(a), Token::Number(b)) => cmp_numbers(a, b),
                    (Token::Text(a), Token::Text(b)) => cmp_text(a, b),
                    // Digits sort before text, mirroring ascii ordering.
                    (Token::Number(_), Token::Text(_)) => Ordering::Less,
                    (Token::Text(_), Token::Number(_)) => Ordering::Greater,
                };
                match ordering {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
        }
    }
}
