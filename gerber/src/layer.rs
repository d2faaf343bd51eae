//! Maps a layer file's extension to its [`LayerKind`] (§6).
//!
//! Grounded on `FILE_EXT_TO_NAME` in the original `standard/gerber.py` / `gerber_set.py`.

use std::path::Path;

use crate::error::GerberError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Drill,
    Outline,
    TopCopper,
    TopMask,
    TopSilk,
    BottomCopper,
    BottomMask,
    BottomSilk,
}

impl LayerKind {
    /// Classify by file extension (case-insensitive, with or without leading dot).
    pub fn from_extension(extension: &str) -> Result<Self, GerberError> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "drl" | "xln" => Self::Drill,
            "gko" | "gm1" | "profile" => Self::Outline,
            "gtl" => Self::TopCopper,
            "gts" => Self::TopMask,
            "gto" => Self::TopSilk,
            "gbl" => Self::BottomCopper,
            "gbs" => Self::BottomMask,
            "gbo" => Self::BottomSilk,
            other => {
                return Err(GerberError::UnknownFileExtension {
                    extension: other.to_string(),
                })
            }
        })
    }

    /// Classify a layer by the extension of its file path.
    pub fn from_path(path: &Path) -> Result<Self, GerberError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| GerberError::UnknownFileExtension {
                extension: path.display().to_string(),
            })?;
        Self::from_extension(extension)
    }

    pub fn is_drill(&self) -> bool {
        matches!(self, Self::Drill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_documented_extension() {
        let cases = [
            ("drl", LayerKind::Drill),
            ("XLN", LayerKind::Drill),
            ("gko", LayerKind::Outline),
            ("gm1", LayerKind::Outline),
            ("PROFILE", LayerKind::Outline),
            ("gtl", LayerKind::TopCopper),
            ("gts", LayerKind::TopMask),
            ("gto", LayerKind::TopSilk),
            ("gbl", LayerKind::BottomCopper),
            ("gbs", LayerKind::BottomMask),
            ("gbo", LayerKind::BottomSilk),
        ];
        for (ext, expected) in cases {
            assert_eq!(LayerKind::from_extension(ext).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_extension() {
        assert!(LayerKind::from_extension("txt").is_err());
    }
}
