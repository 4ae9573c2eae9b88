/// Terminal prompt for a human judge.
///
/// Shows the two candidates of a comparison and turns the judge's one-word
/// answer into a command and side.
use mergerank_core::{Command, Comparison, Side};

/// What the judge typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Decide(Command, Side),
    Quit,
}

/// Build the prompt shown for one comparison.
pub fn build_prompt(c: &Comparison<String>, headers: &[String]) -> String {
    let header_line = if headers.is_empty() {
        String::new()
    } else {
        format!("({})\n", headers.join(" | "))
    };
    let stolen = if c.stolen {
        "Note: someone else may be answering this comparison too.\n\n"
    } else {
        ""
    };
    format!(
        "{stolen}\
         {header_line}\
         Option 1 (#{}):\n{}\n\n\
         Option 2 (#{}):\n{}\n\n\
         Which ranks higher?\n\
         \x20 1 / 2    option 1 / option 2 ranks higher\n\
         \x20 s1 / s2  strike option 1 / option 2 from the ranking\n\
         \x20 p1 / p2  accept option 1 / option 2 into the top outright\n\
         \x20 q        quit\n",
        c.left.position, c.left.record, c.right.position, c.right.record,
    )
}

/// Parse one line of judge input. `None` means "ask again".
pub fn parse_answer(line: &str) -> Option<Answer> {
    let answer = line.trim().to_ascii_lowercase();
    if answer == "q" || answer == "quit" {
        return Some(Answer::Quit);
    }

    let (command, option) = match answer.as_bytes() {
        [b's', rest @ ..] => (Command::Strike, rest),
        [b'p', rest @ ..] => (Command::Pass, rest),
        rest => (Command::Sort, rest),
    };
    let side = match option {
        b"1" => Side::Left,
        b"2" => Side::Right,
        _ => return None,
    };
    Some(Answer::Decide(command, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergerank_core::{Item, Path};

    fn comparison(stolen: bool) -> Comparison<String> {
        Comparison {
            path: Path::root(),
            left: Item { position: 3, record: "Pizza".to_string() },
            right: Item { position: 8, record: "Sushi".to_string() },
            stolen,
        }
    }

    #[test]
    fn test_build_prompt_contains_all_parts() {
        let prompt = build_prompt(&comparison(false), &["dish".to_string()]);
        assert!(prompt.starts_with("(dish)\n"));
        assert!(prompt.contains("Option 1 (#3):\nPizza"));
        assert!(prompt.contains("Option 2 (#8):\nSushi"));
        assert!(prompt.contains("p1 / p2"));
        assert!(!prompt.contains("someone else"));
    }

    #[test]
    fn test_build_prompt_flags_stolen_work() {
        let prompt = build_prompt(&comparison(true), &[]);
        assert!(prompt.starts_with("Note: someone else"));
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("1"), Some(Answer::Decide(Command::Sort, Side::Left)));
        assert_eq!(parse_answer(" 2\n"), Some(Answer::Decide(Command::Sort, Side::Right)));
        assert_eq!(parse_answer("S1"), Some(Answer::Decide(Command::Strike, Side::Left)));
        assert_eq!(parse_answer("p2"), Some(Answer::Decide(Command::Pass, Side::Right)));
        assert_eq!(parse_answer("q"), Some(Answer::Quit));
        assert_eq!(parse_answer("3"), None);
        assert_eq!(parse_answer("s"), None);
        assert_eq!(parse_answer(""), None);
    }
}
