//! Writing of instances in batches.

use std::io::Write;

use crate::error::EvnormError;
use crate::instance::Instance;

/// Writers of instance batches.
pub trait WriteBatch {
    /// Write a batch of instances.
    fn write_batch(&mut self, batch: &[Instance]) -> Result<(), EvnormError>;
}

impl<T> WriteBatch for &mut T
where
    T: WriteBatch + ?Sized,
{
    fn write_batch(&mut self, batch: &[Instance]) -> Result<(), EvnormError> {
        (**self).write_batch(batch)
    }
}

/// Writer of instances as JSON lines.
pub struct JsonLinesWriter<W> {
    write: W,
}

impl<W> JsonLinesWriter<W>
where
    W: Write,
{
    pub fn new(write: W) -> Self {
        JsonLinesWriter { write }
    }

    pub fn into_inner(self) -> W {
        self.write
    }
}

impl<W> WriteBatch for JsonLinesWriter<W>
where
    W: Write,
{
    fn write_batch(&mut self, batch: &[Instance]) -> Result<(), EvnormError> {
        for instance in batch {
            serde_json::to_writer(&mut self.write, instance).map_err(|err| {
                EvnormError::JSonSerialization(
                    format!("Cannot write instance `{}`", instance.id),
                    err,
                )
            })?;
            writeln!(self.write)?;
        }

        self.write.flush()?;

        Ok(())
    }
}

/// Buffer that writes instances in batches of a fixed size.
///
/// Instances are written in the order in which they are pushed. A batch
/// is written as soon as it is full. The remaining instances are written
/// by [`BatchWriter::finish`]. If the writer is dropped without finishing,
/// the remaining instances are written by the destructor and errors are
/// logged.
pub struct BatchWriter<W>
where
    W: WriteBatch,
{
    writer: W,
    batch_size: usize,
    buffer: Vec<Instance>,
    n_written: usize,
}

impl<W> BatchWriter<W>
where
    W: WriteBatch,
{
    /// Construct a batch writer.
    ///
    /// Panics when `batch_size` is zero.
    pub fn new(writer: W, batch_size: usize) -> Self {
        assert!(batch_size > 0, "Batch size should at least be 1.");

        BatchWriter {
            writer,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            n_written: 0,
        }
    }

    /// Queue an instance, writing the batch when it is full.
    pub fn push(&mut self, instance: Instance) -> Result<(), EvnormError> {
        self.buffer.push(instance);

        if self.buffer.len() == self.batch_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Write the queued instances.
    pub fn flush(&mut self) -> Result<(), EvnormError> {
        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        self.writer.write_batch(&batch)?;
        self.n_written += batch.len();
        Ok(())
    }

    /// Write the remaining instances.
    pub fn finish(&mut self) -> Result<(), EvnormError> {
        self.flush()
    }

    /// The number of instances that were written.
    pub fn n_written(&self) -> usize {
        self.n_written
    }

    /// The number of instances that are queued.
    pub fn n_pending(&self) -> usize {
        self.buffer.len()
    }
}

impl<W> Drop for BatchWriter<W>
where
    W: WriteBatch,
{
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            if let Err(err) = self.flush() {
                log::error!("Error writing instances: {}", err);
            }
        }
    }
}
