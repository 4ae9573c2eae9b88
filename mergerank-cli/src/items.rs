/// Item list loading: JSON array of strings, or plain text with one item per line.
///
/// With a header line, the first line names the columns. Headers are only
/// carried through to the export, never used for ranking.
use serde_json::from_str as parse_json;

/// Parsed input: items in file order plus column headers (possibly empty).
#[derive(Debug, PartialEq)]
pub struct ItemList {
    pub items: Vec<String>,
    pub headers: Vec<String>,
}

/// Split a header line on tabs if it has any, otherwise on commas.
fn split_header(line: &str) -> Vec<String> {
    let sep = if line.contains('\t') { '\t' } else { ',' };
    line.split(sep).map(|h| h.trim().to_string()).filter(|h| !h.is_empty()).collect()
}

/// Parse a string as either a JSON array of strings or plain text (one item per line).
pub fn parse_items(content: &str, header: bool) -> Result<ItemList, String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        if header {
            return Err("--header only applies to plain-text item files".to_string());
        }
        let items: Vec<String> = parse_json(trimmed)
            .map_err(|e| format!("File looks like JSON but failed to parse: {e}"))?;
        return Ok(ItemList {
            items: items.into_iter().filter(|s| !s.trim().is_empty()).collect(),
            headers: Vec::new(),
        });
    }

    let mut lines = trimmed
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty());
    let headers = if header {
        lines.next().map(split_header).unwrap_or_default()
    } else {
        Vec::new()
    };
    Ok(ItemList {
        items: lines.map(str::to_string).collect(),
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_skip_blanks() {
        let list = parse_items("  Pizza\n\nSushi  \nTacos\n", false).unwrap();
        assert_eq!(list.items, vec!["Pizza", "Sushi", "Tacos"]);
        assert!(list.headers.is_empty());
    }

    #[test]
    fn test_json_array() {
        let list = parse_items(r#"["a", " ", "b"]"#, false).unwrap();
        assert_eq!(list.items, vec!["a", "b"]);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = parse_items("[1, 2", false).unwrap_err();
        assert!(err.contains("failed to parse"));
    }

    #[test]
    fn test_header_line() {
        let list = parse_items("title, year\nAlien, 1979\nHeat, 1995\n", true).unwrap();
        assert_eq!(list.headers, vec!["title", "year"]);
        assert_eq!(list.items, vec!["Alien, 1979", "Heat, 1995"]);

        let list = parse_items("title\tyear\nAlien\t1979\n", true).unwrap();
        assert_eq!(list.headers, vec!["title", "year"]);
    }

    #[test]
    fn test_header_with_json_rejected() {
        assert!(parse_items(r#"["a"]"#, true).is_err());
    }
}
