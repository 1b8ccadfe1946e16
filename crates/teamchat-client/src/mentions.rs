//! `@Name` mention detection.
//!
//! A mention is `@` followed by a word, optional whitespace and an optional
//! second word, so both `@Sarah` and `@John Admin` are recognised.  Tokens
//! resolve case-insensitively to the first user whose display name contains
//! them; if the two-word form does not match, the first word alone is tried.

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

use serde::Serialize;

use teamchat_shared::UserId;
use teamchat_store::User;

/// One `@` token found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mention {
    /// Byte range of the whole token, `@` included.
    pub span: Range<usize>,
    /// Token text without the `@`, trailing whitespace trimmed.
    pub text: String,
    /// The user the token resolved to, if any.
    pub user: Option<UserId>,
}

struct Token<'a> {
    span: Range<usize>,
    first_word: &'a str,
    full: &'a str,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn advance_while(chars: &mut Peekable<CharIndices<'_>>, from: usize, pred: fn(char) -> bool) -> usize {
    let mut end = from;
    while let Some(&(i, c)) = chars.peek() {
        if !pred(c) {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    end
}

fn tokens(content: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut chars = content.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let word_start = at + 1;
        let first_end = advance_while(&mut chars, word_start, is_word);
        if first_end == word_start {
            continue;
        }
        let gap_end = advance_while(&mut chars, first_end, char::is_whitespace);
        let second_end = advance_while(&mut chars, gap_end, is_word);
        let end = if second_end > gap_end { second_end } else { first_end };

        out.push(Token {
            span: at..end,
            first_word: &content[word_start..first_end],
            full: &content[word_start..end],
        });
    }

    out
}

/// Resolve a mention token against the user list.
pub fn resolve(users: &[User], token: &str) -> Option<UserId> {
    let needle = token.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    users
        .iter()
        .find(|u| u.name.to_lowercase().contains(&needle))
        .map(|u| u.id)
}

/// Every mention in `content`, in order of appearance.
pub fn find_mentions(content: &str, users: &[User]) -> Vec<Mention> {
    tokens(content)
        .into_iter()
        .map(|token| {
            let full = resolve(users, token.full).map(|id| (id, token.full));
            let (user, text) = match full {
                Some((id, text)) => (Some(id), text),
                None => match resolve(users, token.first_word) {
                    Some(id) => (Some(id), token.first_word),
                    None => (None, token.full),
                },
            };
            let end = token.span.start + 1 + text.len();
            Mention {
                span: token.span.start..end,
                text: text.to_string(),
                user,
            }
        })
        .collect()
}
