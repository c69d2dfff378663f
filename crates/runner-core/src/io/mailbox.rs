//! Atomic publish of uniquely-named JSON entries

use crate::io::error::MailboxError;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Length of the random suffix in entry names
pub const ENTRY_SUFFIX_LEN: usize = 6;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Build an entry file name for the given epoch-millisecond timestamp
///
/// The result has the shape `{millis}-{suffix}.json`. The suffix draws from the
/// random bytes of a v4 UUID mapped onto `[a-z0-9]`.
pub fn entry_name(millis: i64) -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let suffix: String = bytes
        .iter()
        .take(ENTRY_SUFFIX_LEN)
        .map(|b| SUFFIX_ALPHABET[usize::from(*b) % SUFFIX_ALPHABET.len()] as char)
        .collect();
    format!("{millis}-{suffix}.json")
}

/// Publish `payload` into the mailbox at `dir`
///
/// The directory is created on demand. Returns the entry file name.
///
/// # Errors
///
/// Returns `MailboxError::Collision` if the chosen name is already taken,
/// `MailboxError::Json` if the payload fails to serialize, or
/// `MailboxError::Io` for any filesystem failure.
pub fn publish<T: Serialize + ?Sized>(dir: &Path, payload: &T) -> Result<String, MailboxError> {
    let name = entry_name(chrono::Utc::now().timestamp_millis());
    publish_as(dir, &name, payload)?;
    Ok(name)
}

/// Publish `payload` under an explicit entry name
///
/// Same write discipline as [`publish`]: the payload lands in
/// `{name}.tmp` next to the final path, is fsynced, then hard-linked to
/// `{name}` and unlinked. Linking never replaces an existing entry.
/// The temporary file is opened with `create_new`, so two producers that pick
/// the same name cannot interleave; whichever comes second sees the final
/// entry and fails with `Collision` instead of overwriting it.
///
/// # Errors
///
/// See [`publish`].
pub fn publish_as<T: Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    payload: &T,
) -> Result<(), MailboxError> {
    fs::create_dir_all(dir).map_err(|e| MailboxError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let final_path = dir.join(name);
    if final_path.file_name().is_none() {
        return Err(MailboxError::InvalidPath { path: final_path });
    }
    let tmp_path = dir.join(format!("{name}.tmp"));

    let content = serde_json::to_vec_pretty(payload).map_err(|e| MailboxError::Json {
        path: final_path.clone(),
        source: e,
    })?;

    {
        let mut tmp_file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(MailboxError::Collision { path: final_path });
            }
            Err(e) => {
                return Err(MailboxError::Io {
                    path: tmp_path,
                    source: e,
                });
            }
        };

        let written = tmp_file
            .write_all(&content)
            .and_then(|()| tmp_file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(MailboxError::Io {
                path: tmp_path,
                source: e,
            });
        }
    }

    // Linking fails atomically if the final name already exists
    match fs::hard_link(&tmp_path, &final_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let _ = fs::remove_file(&tmp_path);
            return Err(MailboxError::Collision { path: final_path });
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(MailboxError::Io {
                path: final_path,
                source: e,
            });
        }
    }
    if let Err(e) = fs::remove_file(&tmp_path) {
        tracing::warn!(path = %tmp_path.display(), error = %e, "failed to remove publish temp file");
    }

    tracing::debug!(path = %final_path.display(), "published mailbox entry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn test_entry_name_shape() {
        let name = entry_name(1_700_000_000_123);
        let stem = name.strip_suffix(".json").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert_eq!(millis, "1700000000123");
        assert_eq!(suffix.len(), ENTRY_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_entry_names_differ_within_same_millisecond() {
        let names: std::collections::HashSet<String> =
            (0..200).map(|_| entry_name(1_700_000_000_000)).collect();
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn test_publish_creates_directory_and_entry() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("ipc").join("messages");

        let name = publish(&dir, &json!({"type": "message", "text": "hi"})).unwrap();

        let content = fs::read_to_string(dir.join(&name)).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_publish_leaves_no_tmp_files() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            publish(temp_dir.path(), &json!({ "n": i })).unwrap();
        }

        let names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 5);
        assert!(names.iter().all(|n| n.ends_with(".json")));
    }

    #[test]
    fn test_publish_as_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let name = "1700000000000-abc123.json";
        publish_as(temp_dir.path(), name, &json!({"text": "first"})).unwrap();

        let result = publish_as(temp_dir.path(), name, &json!({"text": "second"}));
        assert!(matches!(result, Err(MailboxError::Collision { .. })));

        let content = fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert!(content.contains("first"));
        assert!(!temp_dir.path().join(format!("{name}.tmp")).exists());
    }

    #[test]
    fn test_publish_as_collides_with_in_flight_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let name = "1700000000000-inflig.json";
        fs::write(temp_dir.path().join(format!("{name}.tmp")), b"{").unwrap();

        let result = publish_as(temp_dir.path(), name, &json!({"text": "x"}));
        assert!(matches!(result, Err(MailboxError::Collision { .. })));
        assert!(!temp_dir.path().join(name).exists());
    }

    #[test]
    fn test_publish_as_never_replaces_entry_created_by_another_producer() {
        let temp_dir = TempDir::new().unwrap();
        let name = "1700000000000-racer1.json";
        // Another producer's entry, written without the tmp discipline
        fs::write(temp_dir.path().join(name), br#"{"text":"theirs"}"#).unwrap();

        let result = publish_as(temp_dir.path(), name, &json!({"text": "ours"}));

        assert!(matches!(result, Err(MailboxError::Collision { .. })));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(name)).unwrap(),
            r#"{"text":"theirs"}"#
        );
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
