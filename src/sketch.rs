//! Sketch documents: JSON array of sketch entries, each holding one
//! signature per k-mer size.
//!
//! ```text
//! [ { "name": ..., "signatures": [ { "ksize": 31, "mins": [u64, ...], ... } ] } ]
//! ```
//!
//! Only `signatures[].ksize` and `signatures[].mins` are read; every other
//! field is ignored.

use serde::Deserialize;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum EntryField {
    Signatures,
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum SignatureField {
    Ksize,
    Mins,
    #[serde(other)]
    Other,
}

/// Deserializes a whole document, appending the `mins` of matching
/// signatures to `out`. `mins` of a signature whose `ksize` was already seen
/// and differs are skipped without allocation.
struct Document<'a> {
    ksize: u32,
    out: &'a mut Vec<u64>,
}

impl<'de> DeserializeSeed<'de> for Document<'_> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, d: D) -> Result<(), D::Error> {
        d.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for Document<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a sequence of sketch entries")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while seq
            .next_element_seed(Entry {
                ksize: self.ksize,
                out: &mut *self.out,
            })?
            .is_some()
        {}
        Ok(())
    }
}

struct Entry<'a> {
    ksize: u32,
    out: &'a mut Vec<u64>,
}

impl<'de> DeserializeSeed<'de> for Entry<'_> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, d: D) -> Result<(), D::Error> {
        d.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for Entry<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a sketch entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let mut seen = false;
        while let Some(key) = map.next_key::<EntryField>()? {
            match key {
                EntryField::Signatures if seen => {
                    return Err(de::Error::duplicate_field("signatures"));
                }
                EntryField::Signatures => {
                    map.next_value_seed(Signatures {
                        ksize: self.ksize,
                        out: &mut *self.out,
                    })?;
                    seen = true;
                }
                EntryField::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        if !seen {
            return Err(de::Error::missing_field("signatures"));
        }
        Ok(())
    }
}

struct Signatures<'a> {
    ksize: u32,
    out: &'a mut Vec<u64>,
}

impl<'de> DeserializeSeed<'de> for Signatures<'_> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, d: D) -> Result<(), D::Error> {
        d.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for Signatures<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a sequence of signatures")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        while let Some(mins) = seq.next_element_seed(Signature { ksize: self.ksize })? {
            self.out.extend(mins);
        }
        Ok(())
    }
}

/// One signature; yields its `mins` if `ksize` matches, else nothing.
struct Signature {
    ksize: u32,
}

impl<'de> DeserializeSeed<'de> for Signature {
    type Value = Vec<u64>;

    fn deserialize<D: de::Deserializer<'de>>(self, d: D) -> Result<Vec<u64>, D::Error> {
        d.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for Signature {
    type Value = Vec<u64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a signature with `ksize` and `mins`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<u64>, A::Error> {
        let mut ksize: Option<u32> = None;
        let mut mins: Option<Vec<u64>> = None;
        while let Some(key) = map.next_key::<SignatureField>()? {
            match key {
                SignatureField::Ksize => ksize = Some(map.next_value()?),
                SignatureField::Mins => match ksize {
                    Some(k) if k != self.ksize => {
                        map.next_value::<IgnoredAny>()?;
                    }
                    _ => mins = Some(map.next_value()?),
                },
                SignatureField::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        match ksize {
            None => Err(de::Error::missing_field("ksize")),
            Some(k) if k == self.ksize => Ok(mins.unwrap_or_default()),
            Some(_) => Ok(Vec::new()),
        }
    }
}

/// Hashes of one sketch file at one k-mer size. Finite, single pass.
pub struct SketchHashes {
    hashes: std::vec::IntoIter<u64>,
}

impl Iterator for SketchHashes {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        self.hashes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hashes.size_hint()
    }
}

/// Reads hash values out of sketch documents for a fixed k-mer size.
#[derive(Clone, Copy, Debug)]
pub struct SketchReader {
    ksize: u32,
}

impl SketchReader {
    pub fn new(ksize: u32) -> Self {
        Self { ksize }
    }

    #[inline]
    pub fn ksize(&self) -> u32 {
        self.ksize
    }

    /// Parse `path` and return the hashes of every signature whose `ksize`
    /// matches, in document order.
    ///
    /// Unreadable files yield [`ExtractError::Io`], malformed documents
    /// [`ExtractError::Parse`].
    pub fn read(&self, path: &Path) -> Result<SketchHashes, ExtractError> {
        let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
        let mut hashes = Vec::new();
        let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));
        Document {
            ksize: self.ksize,
            out: &mut hashes,
        }
        .deserialize(&mut de)
        .and_then(|()| de.end())
        .map_err(|source| {
            if source.is_io() {
                ExtractError::io(path, source.into())
            } else {
                ExtractError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(SketchHashes {
            hashes: hashes.into_iter(),
        })
    }
}

/// True if `path` names an existing regular file that can be opened for reading.
pub fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Check every path, reporting all unreadable ones at once.
pub fn validate_paths<P: AsRef<Path>>(paths: &[P]) -> Result<(), ExtractError> {
    let invalid: Vec<PathBuf> = paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !is_readable_file(p))
        .map(Path::to_path_buf)
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ExtractError::InvalidInput { paths: invalid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_doc(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_only_matching_ksize() {
        let f = write_doc(
            r#"[{"name":"a","signatures":[
                {"ksize":21,"mins":[7,8]},
                {"ksize":31,"mins":[1,2,3],"seed":42}
            ]},{"signatures":[{"ksize":31,"mins":[4]}]}]"#,
        );
        let hashes: Vec<u64> = SketchReader::new(31).read(f.path()).unwrap().collect();
        assert_eq!(hashes, vec![1, 2, 3, 4]);
        let hashes: Vec<u64> = SketchReader::new(51).read(f.path()).unwrap().collect();
        assert!(hashes.is_empty());
    }

    #[test]
    fn other_ksize_mins_are_skipped_in_any_field_order() {
        let f = write_doc(
            r#"[{"signatures":[
                {"ksize":21,"mins":[1,"not a hash"]},
                {"mins":[5,6],"ksize":31},
                {"mins":[9],"ksize":21},
                {"ksize":31}
            ],"name":"x"}]"#,
        );
        let hashes: Vec<u64> = SketchReader::new(31).read(f.path()).unwrap().collect();
        assert_eq!(hashes, vec![5, 6]);
    }

    #[test]
    fn structural_errors_are_parse_errors() {
        for body in [
            r#"{"signatures":[]}"#,
            r#"[{"name":"no signatures"}]"#,
            r#"[{"signatures":[{"mins":[1]}]}]"#,
            r#"[] trailing"#,
        ] {
            let f = write_doc(body);
            assert!(
                matches!(SketchReader::new(31).read(f.path()), Err(ExtractError::Parse { .. })),
                "{body}"
            );
        }
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let f = write_doc(r#"[{"signatures":[{"ksize":31,"mins":[1,"x"]}]}]"#);
        match SketchReader::new(31).read(f.path()) {
            Err(ExtractError::Parse { path, .. }) => assert_eq!(path, f.path()),
            other => panic!("expected parse error, got {:?}", other.map(|h| h.count())),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.sig");
        assert!(matches!(
            SketchReader::new(31).read(&missing),
            Err(ExtractError::Io { .. })
        ));
        assert!(!is_readable_file(&missing));
        assert!(!is_readable_file(dir.path()));
    }

    #[test]
    fn validate_paths_lists_every_invalid_path() {
        let good = write_doc("[]");
        let dir = tempfile::tempdir().unwrap();
        let bad1 = dir.path().join("one.sig");
        let bad2 = dir.path().join("two.sig");
        let paths = vec![bad1.clone(), good.path().to_path_buf(), bad2.clone()];
        match validate_paths(&paths) {
            Err(ExtractError::InvalidInput { paths }) => assert_eq!(paths, vec![bad1, bad2]),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
