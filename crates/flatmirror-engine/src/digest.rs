//! Content fingerprinting for change detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;
use tracing::debug;

use flatmirror_core::ContentHash;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the full-content BLAKE3 digest of a file.
///
/// Returns `None` on any I/O error; an unreadable or vanished file is
/// treated as absent rather than failing the whole pass.
pub fn fingerprint(path: &Path) -> Option<ContentHash> {
    match hash_file(path) {
        Ok(hash) => Some(hash),
        Err(error) => {
            debug!(path = %path.display(), %error, "fingerprint unavailable");
            None
        }
    }
}

fn hash_file(path: &Path) -> std::io::Result<ContentHash> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Decide whether a tracked file needs copying: true when the source
/// digest differs from the destination digest, where an absent destination
/// digest means "new file".
pub fn needs_sync(src: &ContentHash, dst: Option<&ContentHash>) -> bool {
    dst != Some(src)
}
