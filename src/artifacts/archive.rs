use crate::errors::GitError;
use std::str::FromStr;

/// Archive formats `git archive` can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Value passed to `git archive --format=`
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::TarGz => ".tar.gz",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            other => Err(GitError::UnsupportedArchiveFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("zip", ArchiveFormat::Zip)]
    #[case("tar.gz", ArchiveFormat::TarGz)]
    #[case("tgz", ArchiveFormat::TarGz)]
    fn parses_supported_formats(#[case] name: &str, #[case] expected: ArchiveFormat) {
        assert_eq!(name.parse::<ArchiveFormat>().unwrap(), expected);
    }

    #[rstest]
    #[case("tar")]
    #[case("rar")]
    #[case("")]
    fn unknown_formats_are_rejected(#[case] name: &str) {
        assert!(matches!(
            name.parse::<ArchiveFormat>(),
            Err(GitError::UnsupportedArchiveFormat(format)) if format == name
        ));
    }
}
