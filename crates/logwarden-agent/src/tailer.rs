//! File tailer
//!
//! One task per watched file, polling metadata on a fixed cadence and
//! reading only the bytes appended since the last tick. Matches
//! `tail -f` semantics: the first successful open seeds the cursor at
//! the current end of file, so historical content is skipped.
//!
//! Rotation: a size below the cursor (truncate-in-place rotation) or a
//! changed inode (move-and-recreate rotation, Unix only) resets the
//! cursor to zero so the fresh file is read from its beginning.
//!
//! Filesystem errors are never fatal. The task logs, waits the retry
//! delay and keeps polling until cancelled.

use std::io::SeekFrom;
use std::time::Duration;

use logwarden_core::WatchedFile;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cap on bytes consumed per file per tick, so one burst cannot stall
/// the remaining files' deliveries behind a huge read.
const MAX_READ_BYTES_PER_TICK: usize = 1024 * 1024;

/// Bound on the carried partial-line fragment. A file that never emits a
/// newline (binary content opened by mistake) gets its fragment dropped
/// instead of growing without limit.
const MAX_PARTIAL_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct TailerOptions {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
}

/// One delivered line, tagged with its source file and a coarse
/// position hint (file size / 100, advisory only).
#[derive(Debug, Clone)]
pub struct TailedLine {
    pub file: WatchedFile,
    pub line: String,
    pub line_number: u64,
}

struct Cursor {
    offset: u64,
    inode: Option<u64>,
    partial: String,
}

/// Spawn the poll loop for one file. The task ends when `cancel` fires
/// or the receiving side of `lines` is dropped.
pub fn spawn_tailer(
    file: WatchedFile,
    options: TailerOptions,
    lines: mpsc::Sender<TailedLine>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_tailer(file, options, lines, cancel))
}

async fn run_tailer(
    file: WatchedFile,
    options: TailerOptions,
    lines: mpsc::Sender<TailedLine>,
    cancel: CancellationToken,
) {
    tracing::info!(path = %file.path.display(), format = file.format.as_str(), "tailing");
    let mut cursor: Option<Cursor> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(options.poll_interval) => {}
        }

        let metadata = match tokio::fs::metadata(&file.path).await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %file.path.display(), %error, "stat failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(options.retry_delay) => {}
                }
                continue;
            }
        };
        let size = metadata.len();
        let inode = inode_of(&metadata);

        let state = match cursor.as_mut() {
            Some(state) => state,
            None => {
                // First successful open: skip the backlog.
                cursor = Some(Cursor {
                    offset: size,
                    inode,
                    partial: String::new(),
                });
                continue;
            }
        };

        let rotated = size < state.offset || (state.inode.is_some() && state.inode != inode);
        if rotated {
            tracing::info!(
                path = %file.path.display(),
                old_offset = state.offset,
                new_size = size,
                "rotation detected, reading from start"
            );
            state.offset = 0;
            state.inode = inode;
            state.partial.clear();
        }

        if size == state.offset {
            continue;
        }

        let available = usize::try_from(size - state.offset).unwrap_or(usize::MAX);
        let chunk = match read_range(&file.path, state.offset, available.min(MAX_READ_BYTES_PER_TICK))
            .await
        {
            Ok(chunk) => chunk,
            Err(error) => {
                tracing::warn!(path = %file.path.display(), %error, "read failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(options.retry_delay) => {}
                }
                continue;
            }
        };
        if chunk.is_empty() {
            continue;
        }

        state.offset += chunk.len() as u64;
        state.partial.push_str(&String::from_utf8_lossy(&chunk));

        if state.partial.len() > MAX_PARTIAL_BYTES {
            tracing::warn!(
                path = %file.path.display(),
                bytes = state.partial.len(),
                "partial line fragment over limit, dropping it"
            );
            state.partial.clear();
            continue;
        }

        // Everything up to the final newline is complete; the rest is an
        // in-progress line carried to the next tick.
        let complete = match state.partial.rfind('\n') {
            Some(pos) => {
                let complete = state.partial[..=pos].to_string();
                state.partial = state.partial[pos + 1..].to_string();
                complete
            }
            None => continue,
        };

        let line_number = size / 100;
        for line in complete.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let delivery = TailedLine {
                file: file.clone(),
                line: line.to_string(),
                line_number,
            };
            tokio::select! {
                _ = cancel.cancelled() => return,
                sent = lines.send(delivery) => {
                    if sent.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn read_range(path: &std::path::Path, offset: u64, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; limit];
    let n = file.read(&mut buf).await?;
    buf.truncate(n);
    Ok(buf)
}

#[cfg(unix)]
fn inode_of(metadata: &std::fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn inode_of(_metadata: &std::fs::Metadata) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use logwarden_core::LogFormat;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(10);

    fn options() -> TailerOptions {
        TailerOptions {
            poll_interval: Duration::from_millis(20),
            retry_delay: Duration::from_millis(50),
        }
    }

    fn append(path: &std::path::Path, text: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    async fn recv(rx: &mut mpsc::Receiver<TailedLine>) -> TailedLine {
        timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for a tailed line")
            .expect("tailer channel closed")
    }

    #[tokio::test]
    async fn delivers_appended_lines_and_skips_backlog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "historical line\n").unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let handle = spawn_tailer(
            WatchedFile::new(&path, LogFormat::Auto),
            options(),
            tx,
            cancel.clone(),
        );

        // Give the tailer time to seed its cursor at end of file.
        tokio::time::sleep(Duration::from_millis(250)).await;
        append(&path, "first new line\nsecond new line\n");

        let first = recv(&mut rx).await;
        assert_eq!(first.line, "first new line");
        let second = recv(&mut rx).await;
        assert_eq!(second.line, "second new line");

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn partial_lines_wait_for_their_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "").unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let handle = spawn_tailer(
            WatchedFile::new(&path, LogFormat::Auto),
            options(),
            tx,
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        append(&path, "incomplete");
        // Nothing should arrive yet; the line has no terminator.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        append(&path, " but now finished\n");
        let line = recv(&mut rx).await;
        assert_eq!(line.line, "incomplete but now finished");

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn truncation_resets_to_start_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "some old content that is long\n").unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let handle = spawn_tailer(
            WatchedFile::new(&path, LogFormat::Auto),
            options(),
            tx,
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(250)).await;

        // Rotate: truncate to zero, then write fresh content.
        std::fs::write(&path, "ERROR: x\n").unwrap();

        let line = recv(&mut rx).await;
        assert_eq!(line.line, "ERROR: x");

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn missing_file_is_retried_until_it_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.log");

        let (tx, mut rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let handle = spawn_tailer(
            WatchedFile::new(&path, LogFormat::Auto),
            options(),
            tx,
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        std::fs::write(&path, "").unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        append(&path, "born late\n");

        let line = recv(&mut rx).await;
        assert_eq!(line.line, "born late");

        cancel.cancel();
        let _ = handle.await;
    }
}
