//! Byte-based progress reporting for dump passes.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;

/// Reader wrapper that reports the running byte count after every read.
///
/// Wrap the raw file (before decompression) so progress is measured against
/// the on-disk size.
pub struct ProgressReader<R: Read> {
    reader: R,
    callback: Box<dyn Fn(u64)>,
    bytes_read: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new<F>(reader: R, callback: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            reader,
            callback: Box::new(callback),
            bytes_read: 0,
        }
    }

    /// Bytes read so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.bytes_read += n as u64;
            (self.callback)(self.bytes_read);
        }
        Ok(n)
    }
}

/// Progress bar sized to the input file, drawn on stderr
pub fn byte_progress_bar(total_bytes: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_bytes);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
    ) {
        pb.set_style(
            style
                .progress_chars("█▓▒░  ")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
