use crate::artifacts::branch::{BRANCH_REF_PREFIX, INVALID_BRANCH_NAME_REGEX};
use crate::errors::{GitError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(GitError::InvalidRefName(name));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|e| GitError::parse("branch name pattern", e.to_string()))?;

        if re.is_match(&name) {
            Err(GitError::InvalidRefName(name))
        } else {
            Ok(Self(name))
        }
    }

    /// Strip `refs/heads/` from a full ref such as `symbolic-ref` prints.
    pub fn try_parse_ref_path(ref_path: &str) -> Result<Self> {
        let name = ref_path
            .trim()
            .strip_prefix(BRANCH_REF_PREFIX)
            .ok_or_else(|| GitError::parse("branch ref", ref_path.trim()))?;
        Self::try_parse(name)
    }

    pub fn ref_path(&self) -> String {
        format!("{BRANCH_REF_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local branch as listed by `show-ref --heads`. Not cached.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Branch {
    name: BranchName,
    path: String,
}

impl Branch {
    pub fn new(name: BranchName) -> Self {
        let path = name.ref_path();
        Branch { name, path }
    }

    pub fn name(&self) -> &BranchName {
        &self.name
    }

    /// Full ref, e.g. `refs/heads/main`
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("main")]
    #[case("feature/login")]
    #[case("release-1.2")]
    fn accepts_valid_names(#[case] name: &str) {
        let branch = Branch::new(BranchName::try_parse(name).unwrap());
        assert_eq!(branch.path(), format!("refs/heads/{name}"));
    }

    #[rstest]
    #[case("")]
    #[case("-delete")]
    #[case(".hidden")]
    #[case("a..b")]
    #[case("topic.lock")]
    #[case("with space")]
    #[case("head@{1}")]
    #[case("trailing/")]
    fn rejects_invalid_names(#[case] name: &str) {
        assert!(matches!(
            BranchName::try_parse(name),
            Err(GitError::InvalidRefName(_))
        ));
    }

    #[test]
    fn strips_the_heads_prefix() {
        let name = BranchName::try_parse_ref_path("refs/heads/main\n").unwrap();
        assert_eq!(name.as_ref(), "main");
        assert!(BranchName::try_parse_ref_path("refs/tags/v1").is_err());
    }
}
