use std::path::{Path, PathBuf};

/// True if `path` exists and is a regular file.
pub(crate) fn is_file(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_file()).unwrap_or(false)
}

/// The `.prj` sidecar path belonging to a `.shp` path.
pub(crate) fn prj_sidecar(shp_path: &Path) -> PathBuf {
    shp_path.with_extension("prj")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn sidecar_replaces_extension() {
        assert_eq!(prj_sidecar(Path::new("data/parcel.shp")), Path::new("data/parcel.prj"));
    }

    #[test]
    fn directories_are_not_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_file(dir.path()));
        assert!(!is_file(&dir.path().join("missing.csv")));

        let file = dir.path().join("present.csv");
        std::fs::write(&file, "PIN\n").unwrap();
        assert!(is_file(&file));
    }
}
