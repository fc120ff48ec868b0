//! Profile branch naming

use crate::{Error, Result};

/// Check that `name` is usable as a local branch name.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason: "name is empty".into(),
        });
    }
    if !git2::Branch::name_is_valid(name)? {
        return Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason: "not a valid git reference name".into(),
        });
    }
    Ok(())
}

/// Convert a branch name to a flat folder name for folder-backed syncers.
///
/// `work/laptop` -> `work-laptop`
pub fn branch_to_folder(branch: &str) -> String {
    let mut result = String::with_capacity(branch.len());
    let mut last_was_dash = true; // skip leading dashes

    for c in branch.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_basic() {
        assert_eq!(branch_to_folder("main"), "main");
    }

    #[test]
    fn test_folder_name_with_slashes() {
        assert_eq!(branch_to_folder("work/laptop"), "work-laptop");
        assert_eq!(branch_to_folder("/a//b/"), "a-b");
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        assert!(validate_branch_name("main").is_ok());
        assert!(validate_branch_name("work/laptop").is_ok());
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("has space").is_err());
        assert!(validate_branch_name("a..b").is_err());
    }
}
