//! Search commands (KEYS)

use super::{Command, CommandResult, bulk_array};
use crate::store::Keyspace;
use bytes::Bytes;

/// KEYS command - Find all keys matching a glob pattern
///
/// Syntax: KEYS pattern
///
/// Supported patterns:
/// - `*` : any run of bytes, including none
/// - `?` : exactly one byte
/// - `[abc]`, `[^abc]`, `[a-z]` : one byte from (or outside) a class
/// - `\x` : the byte `x` literally
pub struct KeysCommand;

impl Command for KeysCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let pattern = &args[0];
        let matching = ks
            .keys()
            .into_iter()
            .filter(|key| glob_match(pattern, key));
        Ok(bulk_array(matching))
    }

    fn name(&self) -> &'static str {
        "KEYS"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// Match `text` against a glob `pattern`
pub(crate) fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Where to resume after the last `*`: pattern index past it, text index
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() {
            match pattern[p] {
                b'*' => {
                    star = Some((p + 1, t));
                    p += 1;
                    continue;
                }
                b'?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                b'[' => {
                    if let Some((matched, next)) = match_class(pattern, p, text[t]) {
                        if matched {
                            p = next;
                            t += 1;
                            continue;
                        }
                    }
                }
                b'\\' if p + 1 < pattern.len() => {
                    if pattern[p + 1] == text[t] {
                        p += 2;
                        t += 1;
                        continue;
                    }
                }
                c => {
                    if c == text[t] {
                        p += 1;
                        t += 1;
                        continue;
                    }
                }
            }
        }

        // Mismatch: let the last `*` swallow one more byte
        match star {
            Some((star_p, star_t)) => {
                p = star_p;
                t = star_t + 1;
                star = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

/// Match one byte against the class starting at `pattern[start] == b'['`
///
/// Returns whether it matched and the pattern index after the class, or
/// None when the class is not terminated.
fn match_class(pattern: &[u8], start: usize, c: u8) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = pattern.get(i) == Some(&b'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < pattern.len() && pattern[i] != b']' {
        if pattern[i] == b'\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == b'-' && pattern[i + 2] != b']' {
            let (lo, hi) = (pattern[i].min(pattern[i + 2]), pattern[i].max(pattern[i + 2]));
            matched |= (lo..=hi).contains(&c);
            i += 3;
        } else {
            matched |= pattern[i] == c;
            i += 1;
        }
    }

    if i >= pattern.len() {
        return None;
    }
    Some((matched != negate, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RespValue;
    use crate::store::Value;

    fn keyspace(keys: &[&str]) -> Keyspace {
        let mut ks = Keyspace::new();
        for key in keys {
            ks.set(Bytes::copy_from_slice(key.as_bytes()), Value::string("v"));
        }
        ks
    }

    fn count(ks: &mut Keyspace, pattern: &str) -> usize {
        match KeysCommand.execute(ks, &[Bytes::copy_from_slice(pattern.as_bytes())]) {
            Ok(RespValue::Array(keys)) => keys.len(),
            other => panic!("Expected array response, got {:?}", other),
        }
    }

    #[test]
    fn test_keys_all() {
        let mut ks = keyspace(&["key1", "key2", "name"]);
        assert_eq!(count(&mut ks, "*"), 3);
    }

    #[test]
    fn test_keys_prefix_suffix_contains() {
        let mut ks = keyspace(&["user:1", "user:2", "session:1", "data:cache", "user_admin"]);
        assert_eq!(count(&mut ks, "user:*"), 2);
        assert_eq!(count(&mut ks, "*:cache"), 1);
        assert_eq!(count(&mut ks, "*admin*"), 1);
        assert_eq!(count(&mut ks, "user:1"), 1);
    }

    #[test]
    fn test_glob_wildcards() {
        assert!(glob_match(b"h?llo", b"hello"));
        assert!(!glob_match(b"h?llo", b"hllo"));
        assert!(glob_match(b"h*llo", b"heeeello"));
        assert!(glob_match(b"a*b*c", b"axxbyyc"));
        assert!(!glob_match(b"a*b*c", b"axxbyy"));
        assert!(glob_match(b"", b""));
        assert!(!glob_match(b"", b"x"));
        assert!(glob_match(b"**", b""));
    }

    #[test]
    fn test_glob_classes_and_escapes() {
        assert!(glob_match(b"h[ae]llo", b"hallo"));
        assert!(!glob_match(b"h[ae]llo", b"hillo"));
        assert!(glob_match(b"h[^e]llo", b"hallo"));
        assert!(!glob_match(b"h[^e]llo", b"hello"));
        assert!(glob_match(b"h[a-c]llo", b"hbllo"));
        assert!(glob_match(b"lock\\*", b"lock*"));
        assert!(!glob_match(b"lock\\*", b"lockx"));
    }
}
