//! Plain-text count dumps: one `<hash>\t<count>\n` line per distinct hash,
//! no header, unspecified line order.

use ahash::AHashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::counter::FrozenCounts;
use crate::error::ExtractError;

fn create(path: &Path) -> Result<BufWriter<File>, ExtractError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|e| ExtractError::io(path, e))?;
    Ok(BufWriter::with_capacity(1 << 20, file))
}

/// Write every `(hash, count)` pair of `counts` to `path`. Returns lines written.
pub fn write_counts_dump(counts: &FrozenCounts, path: &Path) -> Result<u64, ExtractError> {
    let mut w = create(path)?;
    let mut lines = 0u64;
    for (hash, count) in counts.iter() {
        writeln!(w, "{hash}\t{count}").map_err(|e| ExtractError::io(path, e))?;
        lines += 1;
    }
    w.flush().map_err(|e| ExtractError::io(path, e))?;
    Ok(lines)
}

/// Read a dump written by [`write_counts_dump`] back into a table.
pub fn read_counts_dump(path: &Path) -> Result<AHashMap<u64, u32>, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let mut table = AHashMap::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| ExtractError::io(path, e))?;
        let bad = |reason: String| ExtractError::DumpFormat {
            path: path.to_path_buf(),
            line: i + 1,
            reason,
        };
        let (hash, count) = line
            .split_once('\t')
            .ok_or_else(|| bad("missing tab separator".into()))?;
        let hash: u64 = hash
            .parse()
            .map_err(|e| bad(format!("hash {hash:?}: {e}")))?;
        let count: u32 = count
            .parse()
            .map_err(|e| bad(format!("count {count:?}: {e}")))?;
        if table.insert(hash, count).is_some() {
            return Err(bad(format!("duplicate hash {hash}")));
        }
    }
    Ok(table)
}

/// Write one hash per line.
pub fn write_hash_list(hashes: &[u64], path: &Path) -> Result<(), ExtractError> {
    let mut w = create(path)?;
    for h in hashes {
        writeln!(w, "{h}").map_err(|e| ExtractError::io(path, e))?;
    }
    w.flush().map_err(|e| ExtractError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::ShardedCounter;

    #[test]
    fn dump_lines_are_tab_separated() {
        let c = ShardedCounter::new(2);
        c.observe_many([u64::MAX, u64::MAX, 3]);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("counts.tsv");
        assert_eq!(write_counts_dump(&c.freeze(), &out).unwrap(), 2);

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["18446744073709551615\t2", "3\t1"]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn malformed_dump_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.tsv");
        std::fs::write(&p, "1\t2\n3 4\n").unwrap();
        match read_counts_dump(&p) {
            Err(ExtractError::DumpFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
