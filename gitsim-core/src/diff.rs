use crate::models::FileStatus;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub status: FileStatus,
    pub old_content: Option<String>,
    pub new_content: Option<String>,
    pub diff_lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
    pub old_line_number: Option<usize>,
    pub new_line_number: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineType {
    Context,
    Addition,
    Deletion,
}

impl FileDiff {
    /// A missing side diffs as an empty file.
    pub fn from_contents(
        path: &str,
        status: FileStatus,
        old_content: Option<&str>,
        new_content: Option<&str>,
    ) -> Self {
        let diff_lines =
            Self::compute_diff(old_content.unwrap_or(""), new_content.unwrap_or(""));

        FileDiff {
            path: path.to_string(),
            status,
            old_content: old_content.map(str::to_string),
            new_content: new_content.map(str::to_string),
            diff_lines,
        }
    }

    fn compute_diff(old_text: &str, new_text: &str) -> Vec<DiffLine> {
        let diff = TextDiff::from_lines(old_text, new_text);
        let mut lines = Vec::new();
        let mut old_line_num = 1;
        let mut new_line_num = 1;

        for change in diff.iter_all_changes() {
            let (line_type, old_num, new_num) = match change.tag() {
                ChangeTag::Delete => {
                    let num = old_line_num;
                    old_line_num += 1;
                    (DiffLineType::Deletion, Some(num), None)
                }
                ChangeTag::Insert => {
                    let num = new_line_num;
                    new_line_num += 1;
                    (DiffLineType::Addition, None, Some(num))
                }
                ChangeTag::Equal => {
                    let old_num = old_line_num;
                    let new_num = new_line_num;
                    old_line_num += 1;
                    new_line_num += 1;
                    (DiffLineType::Context, Some(old_num), Some(new_num))
                }
            };

            lines.push(DiffLine {
                line_type,
                content: change.to_string(),
                old_line_number: old_num,
                new_line_number: new_num,
            });
        }

        lines
    }

    /// (additions, deletions)
    pub fn stats(&self) -> (usize, usize) {
        self.diff_lines
            .iter()
            .fold((0, 0), |(add, del), line| match line.line_type {
                DiffLineType::Addition => (add + 1, del),
                DiffLineType::Deletion => (add, del + 1),
                DiffLineType::Context => (add, del),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_computation() {
        let old_text = "line 1\nline 2\nline 3\n";
        let new_text = "line 1\nline 2 modified\nline 3\nline 4\n";

        let diff_lines = FileDiff::compute_diff(old_text, new_text);

        assert!(!diff_lines.is_empty());
        assert!(diff_lines
            .iter()
            .any(|l| l.line_type == DiffLineType::Addition));
        assert!(diff_lines
            .iter()
            .any(|l| l.line_type == DiffLineType::Deletion));
    }

    #[test]
    fn test_new_file_is_all_additions() {
        let file_diff =
            FileDiff::from_contents("test.txt", FileStatus::Added, None, Some("Hello\nRust\n"));

        assert_eq!(file_diff.path, "test.txt");
        assert!(file_diff.old_content.is_none());
        assert_eq!(file_diff.stats(), (2, 0));
        assert_eq!(file_diff.diff_lines[1].new_line_number, Some(2));
    }

    #[test]
    fn test_deleted_file_is_all_deletions() {
        let file_diff =
            FileDiff::from_contents("test.txt", FileStatus::Deleted, Some("Hello\n"), None);

        assert!(file_diff.new_content.is_none());
        assert_eq!(file_diff.stats(), (0, 1));
    }
}
