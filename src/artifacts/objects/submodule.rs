//! Submodule references
//!
//! A submodule shows up twice in a commit: as a `160000` tree entry pinning
//! a commit of the other repository, and as a section of `.gitmodules`
//! recording where that repository lives:
//!
//! ```text
//! [submodule "vendor/lib"]
//!     path = vendor/lib
//!     url = https://example.com/lib.git
//! ```

use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{GitError, Result};
use derive_new::new;
use regex::Regex;
use std::collections::BTreeMap;

const SECTION_REGEX: &str = r#"^\[\s*submodule\s+"(.+)"\s*\]$"#;

/// One `.gitmodules` section
#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct SubModule {
    name: String,
    path: String,
    url: String,
}

impl SubModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse `.gitmodules` content into submodules keyed by path.
    ///
    /// Sections lacking a path or a url are skipped, as git itself ignores
    /// them. Keys are case-insensitive.
    pub fn parse_gitmodules(content: &str) -> Result<BTreeMap<String, SubModule>> {
        let section = Regex::new(SECTION_REGEX)
            .map_err(|e| GitError::parse("gitmodules pattern", e.to_string()))?;

        let mut modules = BTreeMap::new();
        let mut current: Option<(String, Option<String>, Option<String>)> = None;

        let mut flush = |current: Option<(String, Option<String>, Option<String>)>| {
            if let Some((name, Some(path), Some(url))) = current {
                modules.insert(path.clone(), SubModule::new(name, path, url));
            }
        };

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(['#', ';']) {
                continue;
            }

            if line.starts_with('[') {
                flush(current.take());
                current = section
                    .captures(line)
                    .map(|captures| (captures[1].to_string(), None, None));
                continue;
            }

            let Some((_, path, url)) = current.as_mut() else {
                continue;
            };
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "path" => *path = Some(value),
                "url" => *url = Some(value),
                _ => {}
            }
        }
        flush(current);

        Ok(modules)
    }
}

/// A commit seen through a submodule entry: the enclosing commit, the
/// recorded remote url and the pinned commit id.
#[derive(Debug, Clone, new)]
pub struct SubModuleFile {
    commit: Commit,
    url: String,
    ref_id: ObjectId,
}

impl SubModuleFile {
    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Commit pinned by the submodule entry
    pub fn ref_id(&self) -> &ObjectId {
        &self.ref_id
    }

    /// Browsable url of the submodule repository.
    ///
    /// `url_prefix` is the web root of the hosting service and `parent_path`
    /// the web path of the page showing the submodule, used to resolve
    /// relative urls.
    pub fn ref_url(&self, url_prefix: &str, parent_path: &str) -> String {
        ref_url(&self.url, url_prefix, parent_path)
    }
}

fn ref_url(recorded: &str, url_prefix: &str, parent_path: &str) -> String {
    if recorded.is_empty() {
        return String::new();
    }

    let url = recorded.strip_suffix(".git").unwrap_or(recorded);

    if let Some(rest) = url.strip_prefix("git://") {
        return format!("http://{rest}");
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    // relative to the owning repository, whose web path ends before `/src/`
    if url.starts_with("./") || url.starts_with("../") {
        let repository_path = parent_path
            .find("/src/")
            .map_or(parent_path, |index| &parent_path[..index]);
        return format!(
            "{}/{}",
            url_prefix.trim_end_matches('/'),
            normalize_path(&format!("{repository_path}/{url}"))
        );
    }

    // scp-like `user@host:path`, skipping `ssh://user@host/path`
    if let (Some(at), Some(colon)) = (url.find('@'), url.rfind(':'))
        && at < colon
    {
        let host = &url[at + 1..colon];
        let path = &url[colon + 1..];
        if url_prefix.contains(host) {
            return format!("{url_prefix}{path}");
        }
        return format!("http://{host}/{path}");
    }

    url.to_string()
}

/// Resolve `.` and `..` segments. `..` never climbs above the root.
fn normalize_path(path: &str) -> String {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
