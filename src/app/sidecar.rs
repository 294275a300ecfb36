// JSON sidecars and snapshots written next to derived artifacts

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Write `value` as pretty JSON through a temp file in the same directory
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| DomainError::Io(e.error))?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DomainError::asset_not_found(path),
        _ => DomainError::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn write_sidecar(path: &Path, sidecar: &SegmentSidecar) -> Result<(), DomainError> {
    write_json_atomic(path, sidecar)
}

pub fn read_sidecar(path: &Path) -> Result<SegmentSidecar, DomainError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_round_trip_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f1").join("talk_segments.json");
        let sidecar = SegmentSidecar {
            timeline: Timeline::Cut,
            segments: vec![Segment::new("hi", 1.0, 2.0)],
        };

        write_sidecar(&path, &sidecar).unwrap();
        assert_eq!(read_sidecar(&path).unwrap(), sidecar);
        // No temp files left behind
        assert_eq!(std::fs::read_dir(dir.path().join("f1")).unwrap().count(), 1);
    }

    #[test]
    fn test_read_missing_sidecar() {
        let err = read_sidecar(Path::new("/no/such/segments.json")).unwrap_err();
        assert!(matches!(err, DomainError::AssetNotFound { .. }));
    }
}
