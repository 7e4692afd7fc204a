use gitsim_core::{Error, Result};

/// Splits a command line on whitespace. Single quotes keep their contents
/// literally; inside double quotes and bare words a backslash escapes the next
/// character.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => current.push(inner),
                        None => return Err(unterminated('\'')),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err(unterminated('"')),
                        },
                        Some(inner) => current.push(inner),
                        None => return Err(unterminated('"')),
                    }
                }
            }
            '\\' => {
                in_token = true;
                current.push(chars.next().unwrap_or('\\'));
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn unterminated(quote: char) -> Error {
    Error::InvalidArguments(format!("unterminated {quote} quote"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(
            tokenize("  add a.txt   hello ").unwrap(),
            vec!["add", "a.txt", "hello"]
        );
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            tokenize(r#"commit -m "first commit" --author 'a b'"#).unwrap(),
            vec!["commit", "-m", "first commit", "--author", "a b"]
        );
        assert_eq!(tokenize(r#"add x.txt """#).unwrap(), vec!["add", "x.txt", ""]);
        assert_eq!(tokenize(r#"pre"mid"post"#).unwrap(), vec!["premidpost"]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            tokenize(r#"add a\ b.txt "say \"hi\"" 'no\escape'"#).unwrap(),
            vec!["add", "a b.txt", r#"say "hi""#, r"no\escape"]
        );
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            tokenize(r#"commit -m "oops"#),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(
            tokenize("add 'x"),
            Err(Error::InvalidArguments(_))
        ));
    }
}
