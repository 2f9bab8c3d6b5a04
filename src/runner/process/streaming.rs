//! Forwarding of child output to the parent's streams.

use std::io::{self, ErrorKind, Read, Write};

use tracing::debug;

const CHUNK: usize = 8 * 1024;

/// Forwarding statistics for one child stream.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub(super) struct ForwardStats {
    pub(super) bytes_read: usize,
    pub(super) bytes_written: usize,
    pub(super) write_failed: bool,
}

/// Copy `reader` into `writer` until end of stream.
///
/// Once a write fails the rest of the stream is still read and discarded so
/// the child never blocks on a full pipe.
pub(super) fn forward_child_output<R, W>(
    mut reader: R,
    mut writer: W,
    stream_name: &'static str,
) -> ForwardStats
where
    R: Read,
    W: Write,
{
    let mut stats = ForwardStats::default();
    let mut buf = [0_u8; CHUNK];
    loop {
        let count = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(stream = stream_name, error = %err, "failed to read child output");
                break;
            }
        };
        stats.bytes_read = stats.bytes_read.saturating_add(count);
        if stats.write_failed {
            continue;
        }
        let chunk = buf.get(..count).unwrap_or_default();
        match writer.write_all(chunk) {
            Ok(()) => stats.bytes_written = stats.bytes_written.saturating_add(count),
            Err(err) => {
                stats.write_failed = true;
                debug!(
                    stream = stream_name,
                    error = %err,
                    "failed to forward child output; discarding the rest"
                );
            }
        }
    }
    if !stats.write_failed
        && let Err(err) = writer.flush()
    {
        debug!(stream = stream_name, error = %err, "failed to flush forwarded output");
    }
    stats
}

/// Forward into the parent's standard error.
pub(super) fn forward_to_stderr<R: Read>(reader: R, stream_name: &'static str) -> ForwardStats {
    let lock = io::stderr().lock();
    forward_child_output(reader, lock, stream_name)
}
