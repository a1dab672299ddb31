//! Extraction of research subtasks from planner output.
//!
//! The planner answers in free text; this module pulls an ordered list of
//! subtask strings out of it. Pure and total: no input is an error, the
//! worst case is an empty list.

/// Maximum number of subtasks (and therefore research stages) per run.
pub const MAX_SUBTASKS: usize = 3;

/// Candidates shorter than this after marker stripping are discarded as noise.
pub const MIN_SUBTASK_LEN: usize = 10;

/// Extract up to [`MAX_SUBTASKS`] subtasks from planner output, in
/// document order.
///
/// A line qualifies as a candidate when it starts with a numbered-list
/// marker (`1.`, `2.`, ...) or contains a hyphen anywhere. The hyphen rule
/// deliberately over-matches: lines with hyphenated words in prose count
/// as candidates too, which affects how many research stages fire.
pub fn extract_subtasks(plan: &str) -> Vec<String> {
    let mut subtasks = Vec::new();

    for line in plan.lines() {
        if subtasks.len() == MAX_SUBTASKS {
            break;
        }

        let line = line.trim();
        if !is_list_candidate(line) {
            continue;
        }

        let cleaned = strip_list_marker(line);
        if cleaned.len() >= MIN_SUBTASK_LEN {
            subtasks.push(cleaned.to_string());
        }
    }

    subtasks
}

fn is_list_candidate(line: &str) -> bool {
    starts_with_number_marker(line) || line.contains('-')
}

fn starts_with_number_marker(line: &str) -> bool {
    let digits = leading_digits(line);
    digits > 0 && line[digits..].starts_with('.')
}

fn leading_digits(line: &str) -> usize {
    line.chars().take_while(|c| c.is_ascii_digit()).count()
}

/// Strip a leading `N.` marker, then a leading `-` marker, then
/// surrounding whitespace.
fn strip_list_marker(line: &str) -> &str {
    let mut rest = line;

    let digits = leading_digits(rest);
    if digits > 0 {
        rest = &rest[digits..];
        rest = rest.strip_prefix('.').unwrap_or(rest);
        rest = rest.trim_start();
    }

    if let Some(stripped) = rest.strip_prefix('-') {
        rest = stripped.trim_start();
    }

    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_list_in_order() {
        let plan = "1. Market size\n2. Key vendors\n3. Adoption barriers";
        assert_eq!(
            extract_subtasks(plan),
            vec!["Market size", "Key vendors", "Adoption barriers"]
        );
    }

    #[test]
    fn extracts_hyphen_list() {
        let plan = "- Research cloud adoption rates\n- Compare vendor pricing models";
        assert_eq!(
            extract_subtasks(plan),
            vec![
                "Research cloud adoption rates",
                "Compare vendor pricing models"
            ]
        );
    }

    #[test]
    fn hyphen_anywhere_qualifies_a_line() {
        // The hyphen in "market-wide" makes this prose line a candidate.
        let plan = "The market-wide trend is strong growth";
        assert_eq!(
            extract_subtasks(plan),
            vec!["The market-wide trend is strong growth"]
        );
    }

    #[test]
    fn discards_short_candidates_as_noise() {
        let plan = "1. Too short\n2. Long enough to be a real subtask";
        assert_eq!(
            extract_subtasks(plan),
            vec!["Long enough to be a real subtask"]
        );
    }

    #[test]
    fn keeps_candidates_at_exactly_minimum_length() {
        let plan = "1. abcdefghij";
        assert_eq!(extract_subtasks(plan), vec!["abcdefghij"]);
    }

    #[test]
    fn truncates_to_three_subtasks() {
        let plan = "1. First research direction\n\
                    2. Second research direction\n\
                    3. Third research direction\n\
                    4. Fourth research direction\n\
                    5. Fifth research direction";
        let subtasks = extract_subtasks(plan);
        assert_eq!(subtasks.len(), 3);
        assert_eq!(subtasks[2], "Third research direction");
    }

    #[test]
    fn non_list_output_yields_empty_list() {
        let plan = "I was unable to identify discrete subtasks for this query.";
        assert!(extract_subtasks(plan).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(extract_subtasks("").is_empty());
    }

    #[test]
    fn strips_marker_and_surrounding_whitespace() {
        let plan = "2.   Key vendors in the market   ";
        assert_eq!(extract_subtasks(plan), vec!["Key vendors in the market"]);
    }

    #[test]
    fn skips_non_candidate_lines_between_items() {
        let plan = "Here is my breakdown:\n\
                    1. Analyze current market size\n\
                    Some commentary without list markers here\n\
                    2. Identify the key vendors";
        assert_eq!(
            extract_subtasks(plan),
            vec!["Analyze current market size", "Identify the key vendors"]
        );
    }
}
