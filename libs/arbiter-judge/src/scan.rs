// Bracket/quote-aware scanning helpers for loosely formatted test-case strings

/// Split on commas that are outside `[...]` and outside double quotes.
/// Parts are returned untrimmed; a trailing empty part is dropped.
pub fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    for c in input.chars() {
        match c {
            '"' if prev != Some('\\') => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' if !in_quotes => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 && !in_quotes => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
        prev = Some(c);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Split on commas that are outside double quotes only, trimming each part
pub fn split_quote_aware(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => parts.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}

/// Byte index of the `]` closing the `[` at `open`
pub fn find_matching_bracket(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, c) in input.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Content of the bracketed list that follows `marker`, e.g. `Operations: [..]`
fn bracketed_after<'a>(input: &'a str, marker: &str) -> Option<&'a str> {
    let start = input.find(marker)?;
    let open = start + input[start..].find('[')?;
    let close = find_matching_bracket(input, open)?;
    Some(&input[open + 1..close])
}

/// Quote-aware elements of the bracketed list following `marker`
pub fn bracket_list_after(input: &str, marker: &str) -> Vec<String> {
    match bracketed_after(input, marker) {
        Some(content) if !content.trim().is_empty() => split_quote_aware(content),
        _ => Vec::new(),
    }
}

/// Argument sets of an operation script: the elements of the bracketed list
/// after `Arguments:`, each kept in its own bracketed form
pub fn argument_sets(input: &str) -> Vec<String> {
    let Some(content) = bracketed_after(input, "Arguments:") else {
        return Vec::new();
    };

    let mut sets = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in content.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            ',' if depth == 0 => {
                sets.push(std::mem::take(&mut current).trim().to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    sets.push(current.trim().to_string());
    sets
}

/// Elements of a `[...]` rendered list with surrounding quotes removed.
/// Anything that is not a bracketed list yields no elements.
pub fn parse_list_output(output: &str) -> Vec<String> {
    let output = output.trim();
    if !(output.starts_with('[') && output.ends_with(']')) || output.len() < 2 {
        return Vec::new();
    }
    let content = &output[1..output.len() - 1];
    if content.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut prev: Option<char> = None;

    for c in content.chars() {
        match c {
            '"' if prev != Some('\\') => in_quotes = !in_quotes,
            ',' if !in_quotes && depth == 0 => {
                items.push(unquote(current.trim()).to_string());
                current.clear();
                prev = Some(c);
                continue;
            }
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => depth -= 1,
            _ => {}
        }
        current.push(c);
        prev = Some(c);
    }

    let last = current.trim();
    if !last.is_empty() {
        items.push(unquote(last).to_string());
    }
    items
}

/// Strip one pair of surrounding double quotes
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

pub fn is_bracketed(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('[') && value.ends_with(']')
}

/// `true` when `input` has an `=` outside of double quotes
pub fn has_unquoted_equals(input: &str) -> bool {
    let mut in_quotes = false;
    for c in input.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '=' if !in_quotes => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top_level_respects_brackets_and_quotes() {
        assert_eq!(split_top_level("2, [100, 50]"), vec!["2", " [100, 50]"]);
        assert_eq!(
            split_top_level(r#""a,b", [[1, 2], [3]], x"#),
            vec![r#""a,b""#, " [[1, 2], [3]]", " x"]
        );
        assert_eq!(split_top_level("[1, 2, 3]"), vec!["[1, 2, 3]"]);
        assert_eq!(split_top_level("1,"), vec!["1"]);
        assert!(split_top_level("").is_empty());
    }

    #[test]
    fn test_find_matching_bracket() {
        let s = "x [[1], [2]] y";
        assert_eq!(find_matching_bracket(s, 2), Some(11));
        assert_eq!(find_matching_bracket(s, 3), Some(5));
        assert_eq!(find_matching_bracket("[1, 2", 0), None);
    }

    #[test]
    fn test_operation_script_parts() {
        let input = r#"Operations: ["LRUCache", "put", "get"], Arguments: [[2], [1, 1], [1]]"#;
        assert_eq!(
            bracket_list_after(input, "Operations:"),
            vec![r#""LRUCache""#, r#""put""#, r#""get""#]
        );
        assert_eq!(argument_sets(input), vec!["[2]", "[1, 1]", "[1]"]);
    }

    #[test]
    fn test_argument_sets_with_empty_sets() {
        let input = "Operations: [Stack, push, pop], Arguments: [[], [5], []]";
        assert_eq!(argument_sets(input), vec!["[]", "[5]", "[]"]);
        assert!(argument_sets("Operations: [a]").is_empty());
    }

    #[test]
    fn test_parse_list_output() {
        assert_eq!(
            parse_list_output(r#"["Worker-1 ready", "Main process waiting"]"#),
            vec!["Worker-1 ready", "Main process waiting"]
        );
        assert_eq!(parse_list_output("[[1, 2], 3]"), vec!["[1, 2]", "3"]);
        assert!(parse_list_output("[]").is_empty());
        assert!(parse_list_output("plain").is_empty());
    }

    #[test]
    fn test_unquoted_equals_detection() {
        assert!(has_unquoted_equals("nums = [1, 2], target = 3"));
        assert!(!has_unquoted_equals(r#""a=b""#));
    }
}
