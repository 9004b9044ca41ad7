use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Result, RevisionError};
use crate::record::FileRecord;

/// URL-safe revision identifier: base64url of a SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct CanonicalRecord<'a> {
    uid: u32,
    gid: u32,
    mode: u32,
    path: &'a str,
    content: String,
}

impl<'a> TryFrom<&'a FileRecord> for CanonicalRecord<'a> {
    type Error = RevisionError;

    fn try_from(record: &'a FileRecord) -> Result<Self> {
        let path = record.path.to_str().ok_or_else(|| {
            RevisionError::Serialization(format!(
                "path \"{}\" is not valid UTF-8",
                record.path.display()
            ))
        })?;
        Ok(Self {
            uid: record.owner_id,
            gid: record.group_id,
            mode: record.mode,
            path,
            content: STANDARD.encode(&record.content),
        })
    }
}

/// RFC 8785 (JCS) encoding of the records, in the order given.
pub fn encode_records(records: &[FileRecord]) -> Result<Vec<u8>> {
    let canonical = records
        .iter()
        .map(CanonicalRecord::try_from)
        .collect::<Result<Vec<_>>>()?;
    serde_jcs::to_vec(&canonical).map_err(|err| RevisionError::Serialization(err.to_string()))
}

/// Hash already canonicalized records into a revision.
pub fn fingerprint(records: &[FileRecord]) -> Result<Revision> {
    let encoded = encode_records(records)?;
    let digest = Sha256::digest(&encoded);
    Ok(Revision(URL_SAFE.encode(digest)))
}
