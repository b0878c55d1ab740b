use std::fmt::Write;

use prowl_core::{ChangedFile, ReviewPrompt};

const PROMPT_HEADER: &str = "\
Please perform a code review on the following changes and provide feedback. \
Below there are the GitHub changes. Be aware that lines starting with + are \
being added and the ones starting with - are being removed.\n\n---\n\n";

const PROMPT_TRAILER: &str = "---";

/// Build the review prompt for a pull request's changed files.
///
/// Each file becomes a `File: <name>` block followed by its patch verbatim,
/// in the order given. Files without a patch get an empty block.
///
/// # Examples
///
/// ```
/// use prowl_core::ChangedFile;
/// use prowl_review::prompt::build_prompt;
///
/// let prompt = build_prompt(&[ChangedFile::new("src/lib.rs", "+fn main() {}")]);
/// assert!(prompt.as_str().contains("File: src/lib.rs\n+fn main() {}\n\n"));
/// assert!(prompt.as_str().ends_with("---"));
/// ```
pub fn build_prompt(files: &[ChangedFile]) -> ReviewPrompt {
    let mut text = String::from(PROMPT_HEADER);
    for file in files {
        let patch = file.patch.as_deref().unwrap_or_default();
        let _ = write!(text, "File: {}\n{patch}\n\n", file.filename);
    }
    text.push_str(PROMPT_TRAILER);
    ReviewPrompt::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<ChangedFile> {
        vec![
            ChangedFile::new("src/token.rs", "@@ -1,2 +1,2 @@\n-let a = 1;\n+let a = 2;"),
            ChangedFile {
                filename: "assets/logo.png".into(),
                patch: None,
            },
            ChangedFile::new("README.md", "@@ -0,0 +1 @@\n+# Simulator"),
        ]
    }

    #[test]
    fn empty_file_list_is_header_and_trailer() {
        let prompt = build_prompt(&[]);
        assert_eq!(prompt.as_str(), format!("{PROMPT_HEADER}{PROMPT_TRAILER}"));
    }

    #[test]
    fn header_explains_diff_convention() {
        let prompt = build_prompt(&[]);
        assert!(prompt.as_str().contains("lines starting with + are being added"));
        assert!(prompt.as_str().contains("- are being removed"));
    }

    #[test]
    fn files_keep_input_order() {
        let prompt = build_prompt(&files());
        let text = prompt.as_str();
        let token = text.find("File: src/token.rs").unwrap();
        let logo = text.find("File: assets/logo.png").unwrap();
        let readme = text.find("File: README.md").unwrap();
        assert!(token < logo && logo < readme);
    }

    #[test]
    fn missing_patch_renders_empty_block() {
        let prompt = build_prompt(&files());
        assert!(prompt.as_str().contains("File: assets/logo.png\n\n\n"));
    }

    #[test]
    fn patch_is_copied_verbatim() {
        let prompt = build_prompt(&files());
        assert!(
            prompt
                .as_str()
                .contains("File: src/token.rs\n@@ -1,2 +1,2 @@\n-let a = 1;\n+let a = 2;\n\n")
        );
    }

    #[test]
    fn identical_input_gives_identical_prompt() {
        assert_eq!(build_prompt(&files()), build_prompt(&files()));
    }

    #[test]
    fn reordered_input_changes_prompt() {
        let mut reversed = files();
        reversed.reverse();
        assert_ne!(build_prompt(&files()), build_prompt(&reversed));
    }
}
