use color_eyre::eyre::{bail, eyre, Error};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Symlink targets at or beyond this many bytes are rejected.
pub const MAX_PATH_SIZE: usize = 1024;

/// Fixed filesystem anchors rubyexec starts from.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Link to the running executable.
    pub self_exe: PathBuf,
    /// Name of the sibling link pointing at the system default runtime.
    pub default_link: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            self_exe: "/proc/self/exe".into(),
            default_link: "ruby".into(),
        }
    }
}

/// Reads one level of symlink at `path`.
pub fn resolve_link(path: &Path) -> Result<PathBuf, Error> {
    let target = nix::fcntl::readlink(path)
        .map_err(|errno| eyre!("failed to resolve {}: {}", path.display(), errno.desc()))?;
    if target.len() >= MAX_PATH_SIZE {
        bail!("resolved path of {} is too long", path.display());
    }
    Ok(PathBuf::from(target))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub exe: PathBuf,
    pub dir: PathBuf,
    pub default_target: PathBuf,
    /// File name of `default_target`, if it is valid UTF-8.
    pub selected: Option<String>,
}

impl Resolved {
    pub fn resolve(layout: &Layout) -> Result<Self, Error> {
        let exe = resolve_link(&layout.self_exe)?;
        let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        let default_target = resolve_link(&dir.join(&layout.default_link))?;
        let selected = default_target
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_owned());
        debug!(
            "resolved {} -> {}, default runtime {} ({selected:?})",
            layout.self_exe.display(),
            exe.display(),
            default_target.display()
        );
        Ok(Resolved {
            exe,
            dir,
            default_target,
            selected,
        })
    }

    /// Where the default runtime lives, anchored to `dir` when the link was
    /// relative.
    pub fn default_path(&self) -> PathBuf {
        if self.default_target.is_absolute() {
            self.default_target.clone()
        } else {
            self.dir.join(&self.default_target)
        }
    }

    /// Where an implementation named `name` would be installed.
    pub fn candidate(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[cfg(test)]
fn tree(default: &str) -> (tempfile::TempDir, Layout) {
    use std::os::unix::fs::symlink;

    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    std::fs::write(bin.join("rubyexec"), "").unwrap();
    symlink(bin.join("rubyexec"), tmp.path().join("self")).unwrap();
    symlink(default, bin.join("ruby")).unwrap();
    let layout = Layout {
        self_exe: tmp.path().join("self"),
        default_link: "ruby".into(),
    };
    (tmp, layout)
}

#[test]
fn test_resolve_relative_default() {
    let (tmp, layout) = tree("ruby31");
    let resolved = Resolved::resolve(&layout).unwrap();
    let bin = tmp.path().join("bin");

    assert_eq!(resolved.exe, bin.join("rubyexec"));
    assert_eq!(resolved.dir, bin);
    assert_eq!(resolved.default_target, PathBuf::from("ruby31"));
    assert_eq!(resolved.selected.as_deref(), Some("ruby31"));
    assert_eq!(resolved.default_path(), bin.join("ruby31"));
    assert_eq!(resolved.candidate("jruby"), bin.join("jruby"));
}

#[test]
fn test_resolve_absolute_default() {
    let (_tmp, layout) = tree("/opt/ruby/bin/jruby");
    let resolved = Resolved::resolve(&layout).unwrap();

    assert_eq!(resolved.selected.as_deref(), Some("jruby"));
    assert_eq!(resolved.default_path(), PathBuf::from("/opt/ruby/bin/jruby"));
}

#[test]
fn test_resolve_missing_default_link() {
    let (tmp, layout) = tree("ruby31");
    std::fs::remove_file(tmp.path().join("bin/ruby")).unwrap();

    let err = Resolved::resolve(&layout).unwrap_err().to_string();
    assert!(err.starts_with("failed to resolve "), "{err}");
    assert!(err.ends_with("bin/ruby: No such file or directory"), "{err}");
}

#[test]
fn test_resolve_not_a_link() {
    let tmp = tempfile::tempdir().unwrap();
    let plain = tmp.path().join("plain");
    std::fs::write(&plain, "").unwrap();

    let err = resolve_link(&plain).unwrap_err().to_string();
    assert!(err.starts_with("failed to resolve "), "{err}");
}

#[test]
fn test_resolve_too_long() {
    let tmp = tempfile::tempdir().unwrap();
    let link = tmp.path().join("long");
    std::os::unix::fs::symlink("x".repeat(MAX_PATH_SIZE), &link).unwrap();

    let err = resolve_link(&link).unwrap_err().to_string();
    assert_eq!(err, format!("resolved path of {} is too long", link.display()));

    std::fs::remove_file(&link).unwrap();
    std::os::unix::fs::symlink("x".repeat(MAX_PATH_SIZE - 1), &link).unwrap();
    assert!(resolve_link(&link).is_ok());
}
