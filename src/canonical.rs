use crate::record::FileRecord;

/// Order records by raw path bytes and drop repeated paths.
///
/// `Path`'s own `Ord` compares component-wise (`/a/b` < `/a.txt`), which is
/// not a byte ordering, so the encoded bytes are compared instead. The sort is
/// stable, so the first of several records with the same path survives.
pub fn canonicalize(mut records: Vec<FileRecord>) -> Vec<FileRecord> {
    records.sort_by(|a, b| a.path_bytes().cmp(b.path_bytes()));
    records.dedup_by(|later, earlier| later.path_bytes() == earlier.path_bytes());
    records
}
