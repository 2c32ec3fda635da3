use std::io::{self, Read, Seek, SeekFrom};
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar that implements the `Read` and `Seek` traits.
///
/// This wrapper of `indicatif`'s `ProgressBar` updates progress based on the
/// current offset within the file.
pub struct ReadProgress<R> {
    inner: R,
    progress_bar: ProgressBar,
}

impl<R> ReadProgress<R>
where
    R: Seek,
{
    pub fn new(mut read: R) -> Result<Self> {
        let len = read.seek(SeekFrom::End(0))? + 1;
        read.seek(SeekFrom::Start(0))?;
        let progress_bar = ProgressBar::new(len);
        progress_bar.set_style(ProgressStyle::with_template("{bar} {bytes}/{total_bytes}")?);

        Ok(ReadProgress {
            inner: read,
            progress_bar,
        })
    }
}

impl<R> Read for ReadProgress<R>
where
    R: Read + Seek,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n_read = self.inner.read(buf)?;
        let pos = self.inner.stream_position()?;
        self.progress_bar.set_position(pos);
        Ok(n_read)
    }
}

impl<R> Seek for ReadProgress<R>
where
    R: Seek,
{
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let pos = self.inner.seek(pos)?;
        self.progress_bar.set_position(pos);
        Ok(pos)
    }
}

impl<R> Drop for ReadProgress<R> {
    fn drop(&mut self) {
        self.progress_bar.finish();
    }
}

/// Progress bar over a known number of instances.
pub fn instance_progress(n_instances: usize) -> Result<ProgressBar> {
    let progress_bar = ProgressBar::new(n_instances as u64);
    progress_bar.set_style(ProgressStyle::with_template(
        "{bar} {pos}/{len} instances",
    )?);
    Ok(progress_bar)
}

/// Measure the number of records converted per second.
///
/// When an instance of `ConversionSpeed` is constructed, it takes the
/// current time. `count_records` should be called with the number of
/// records that were converted. The conversion speed is logged when
/// the instance is dropped.
pub struct ConversionSpeed {
    start: Instant,
    n_records: usize,
}

impl ConversionSpeed {
    /// Construct a new instance.
    pub fn new() -> Self {
        ConversionSpeed {
            start: Instant::now(),
            n_records: 0,
        }
    }

    /// Count converted records.
    pub fn count_records(&mut self, n_records: usize) {
        self.n_records += n_records;
    }
}

impl Default for ConversionSpeed {
    fn default() -> Self {
        ConversionSpeed::new()
    }
}

impl Drop for ConversionSpeed {
    fn drop(&mut self) {
        let elapsed_secs = self.start.elapsed().as_secs_f32();
        log::info!(
            "Converted {} records in {:.1}s ({:.1} records/s)",
            self.n_records,
            elapsed_secs,
            self.n_records as f32 / elapsed_secs
        );
    }
}
