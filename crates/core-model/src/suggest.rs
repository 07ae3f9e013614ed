//! Autocomplete support: locate the emoji token being typed at the end of input.

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn name_after_last_colon(s: &str) -> Option<&str> {
    let (_, name) = s.rsplit_once(':')?;
    name.chars().all(is_name_char).then_some(name)
}

/// Partial name of a trailing `:name` or `:name:` token, `Some("")` right
/// after a bare `:`. A closed token wins over the empty token its closing
/// colon would otherwise open.
pub fn completion_prefix(input: &str) -> Option<&str> {
    if let Some(head) = input.strip_suffix(':')
        && let Some(name) = name_after_last_colon(head)
    {
        return Some(name);
    }
    name_after_last_colon(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_token_at_end() {
        assert_eq!(completion_prefix("hello :smi"), Some("smi"));
        assert_eq!(completion_prefix("hello :"), Some(""));
    }

    #[test]
    fn closed_token_at_end() {
        assert_eq!(completion_prefix("hello :smile:"), Some("smile"));
        assert_eq!(completion_prefix("::"), Some(""));
    }

    #[test]
    fn no_token() {
        assert_eq!(completion_prefix("hello"), None);
        assert_eq!(completion_prefix("a :b c"), None);
        assert_eq!(completion_prefix(""), None);
    }
}
