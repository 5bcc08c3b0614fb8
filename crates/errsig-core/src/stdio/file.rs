//! `fopen` with C mode strings.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::errno::{self, EINVAL};

/// Parsed C `fopen` mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    /// `x` flag: fail if the file already exists.
    pub exclusive: bool,
}

impl OpenMode {
    /// Parse a mode string such as `"r"`, `"wb"`, `"a+"` or `"w+x"`.
    ///
    /// The primary letter must come first. `+` and the `b`/`e`/`x` flags may
    /// follow in any order; `x` is only meaningful for `w` modes. Anything
    /// else is rejected.
    #[must_use]
    pub fn parse(mode: &str) -> Option<Self> {
        let mut chars = mode.chars();
        let mut parsed = match chars.next()? {
            'r' => Self {
                read: true,
                write: false,
                append: false,
                create: false,
                truncate: false,
                exclusive: false,
            },
            'w' => Self {
                read: false,
                write: true,
                append: false,
                create: true,
                truncate: true,
                exclusive: false,
            },
            'a' => Self {
                read: false,
                write: true,
                append: true,
                create: true,
                truncate: false,
                exclusive: false,
            },
            _ => return None,
        };

        let mut seen_plus = false;
        for flag in chars {
            match flag {
                '+' if !seen_plus => {
                    seen_plus = true;
                    parsed.read = true;
                    parsed.write = true;
                }
                'b' | 'e' => {}
                'x' if parsed.truncate => parsed.exclusive = true,
                _ => return None,
            }
        }
        Some(parsed)
    }

    fn options(self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.read(self.read).append(self.append);
        if !self.append {
            opts.write(self.write);
        }
        if self.exclusive {
            opts.create_new(true);
        } else {
            opts.create(self.create).truncate(self.truncate);
        }
        opts
    }
}

/// Opens `path` according to the C mode string `mode`.
///
/// Returns `None` on failure and sets errno: `EINVAL` for a malformed mode,
/// otherwise the OS error (`ENOENT` for a missing file opened with `"r"`).
/// errno is left untouched on success.
pub fn fopen(path: &Path, mode: &str) -> Option<File> {
    let Some(parsed) = OpenMode::parse(mode) else {
        errno::set_errno(EINVAL);
        return None;
    };
    match parsed.options().open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            errno::set_errno(errno::errno_from_io(&err));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::{EEXIST, ENOENT, get_errno, set_errno};

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "errsig-fopen-{tag}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_primary_modes() {
        let r = OpenMode::parse("r").unwrap();
        assert!(r.read && !r.write && !r.create);

        let w = OpenMode::parse("w").unwrap();
        assert!(!w.read && w.write && w.create && w.truncate);

        let a = OpenMode::parse("a").unwrap();
        assert!(a.append && a.create && !a.truncate);

        let rp = OpenMode::parse("r+").unwrap();
        assert!(rp.read && rp.write && !rp.create);

        let wx = OpenMode::parse("wbx").unwrap();
        assert!(wx.exclusive);
    }

    #[test]
    fn parse_rejects_malformed_modes() {
        for bad in ["", "q", "rw", "r++", "ax", "rx", "+r"] {
            assert_eq!(OpenMode::parse(bad), None, "mode {bad:?} should be rejected");
        }
    }

    #[test]
    fn missing_file_sets_enoent() {
        set_errno(0);
        let dir = scratch_dir("missing");
        let file = fopen(&dir.join("NON_existing_file.txt"), "r");
        assert!(file.is_none());
        assert_eq!(get_errno(), ENOENT);
    }

    #[test]
    fn bad_mode_sets_einval() {
        set_errno(0);
        assert!(fopen(Path::new("whatever"), "z").is_none());
        assert_eq!(get_errno(), EINVAL);
    }

    #[test]
    fn success_leaves_errno_untouched() {
        let dir = scratch_dir("ok");
        let path = dir.join("created.txt");
        set_errno(ENOENT);
        assert!(fopen(&path, "w").is_some());
        assert!(fopen(&path, "r").is_some());
        assert_eq!(get_errno(), ENOENT);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn exclusive_create_fails_on_existing_file() {
        let dir = scratch_dir("excl");
        let path = dir.join("exists.txt");
        assert!(fopen(&path, "w").is_some());
        set_errno(0);
        assert!(fopen(&path, "wx").is_none());
        assert_eq!(get_errno(), EEXIST);
        let _ = std::fs::remove_file(&path);
    }
}
