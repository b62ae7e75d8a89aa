use crate::error::Result;
use crate::space::VectorSpace;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths of the two dump files for `prefix`: `<prefix>.vecs.txt` and `<prefix>.wds.txt`.
pub fn dump_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let base = prefix.as_os_str().to_string_lossy();
    (
        PathBuf::from(format!("{}.vecs.txt", base)),
        PathBuf::from(format!("{}.wds.txt", base)),
    )
}

/// Write the vectors of `space` (one row per line) and its words (one per line)
/// side by side, in the same order.
pub fn write_mapped_vectors(space: &VectorSpace, prefix: &Path) -> Result<(PathBuf, PathBuf)> {
    let (vecs_path, wds_path) = dump_paths(prefix);

    let mut vecs = BufWriter::new(File::create(&vecs_path)?);
    for row in space.matrix().rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.18e}", v)).collect();
        writeln!(vecs, "{}", line.join(" "))?;
    }
    vecs.flush()?;

    let mut wds = BufWriter::new(File::create(&wds_path)?);
    for word in space.id2word() {
        writeln!(wds, "{}", word)?;
    }
    wds.flush()?;

    Ok((vecs_path, wds_path))
}
