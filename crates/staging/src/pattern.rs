//! Redis-style key globs (`*` and `?`)

/// Whether `key` matches `pattern`
///
/// `*` matches any run of characters (including none), `?` exactly one.
/// Every other character matches itself.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position after the last `*` and the key index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p + 1, k));
                p += 1;
            }
            Some('?') => {
                p += 1;
                k += 1;
            }
            Some(c) if *c == key[k] => {
                p += 1;
                k += 1;
            }
            _ => match backtrack {
                Some((star_p, star_k)) => {
                    p = star_p;
                    k = star_k + 1;
                    backtrack = Some((star_p, star_k + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
