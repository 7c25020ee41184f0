//! The fixed set of selectable logos.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BannerError, BannerResult};

const LOGO_EXTENSIONS: [&str; 2] = ["png", "svg"];

/// A logo file and the name it is offered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoAsset {
    pub path: PathBuf,
    /// File stem, e.g. `badge` for `assets/logos/badge.png`.
    pub name: String,
}

/// Lists the `.png` and `.svg` files directly inside `dir`, sorted by name.
///
/// A missing directory has no logos.
pub fn discover_logos(dir: &Path) -> BannerResult<Vec<LogoAsset>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BannerError::io(dir, e)),
    };

    let mut logos = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BannerError::io(dir, e))?.path();
        if !path.is_file() || !has_logo_extension(&path) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        logos.push(LogoAsset {
            name: name.to_string(),
            path,
        });
    }

    logos.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(logos)
}

fn has_logo_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOGO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_png_and_svg_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.png", "alpha.svg", "notes.txt", "Beta.PNG"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let logos = discover_logos(dir.path()).unwrap();
        let names: Vec<_> = logos.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "alpha", "zeta"]);
        assert_eq!(logos[2].path, dir.path().join("zeta.png"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_logos(&dir.path().join("absent")).unwrap().is_empty());
    }
}
