use std::io::BufRead;

use anyhow::Result;

/// Count the records of a JSON lines file.
///
/// A final record without a trailing newline is counted as well.
pub fn count_records(mut buf_read: impl BufRead) -> Result<usize> {
    let mut n_records = 0;
    let mut last = b'\n';

    loop {
        let buf = buf_read.fill_buf()?;

        if buf.is_empty() {
            break;
        }

        n_records += bytecount::count(buf, b'\n');
        last = buf[buf.len() - 1];

        // Satisfy borrows checker.
        let buf_len = buf.len();
        buf_read.consume(buf_len);
    }

    if last != b'\n' {
        n_records += 1;
    }

    Ok(n_records)
}

#[cfg(test)]
mod tests {
    use super::count_records;

    #[test]
    fn counts_records() {
        assert_eq!(count_records("".as_bytes()).unwrap(), 0);
        assert_eq!(count_records("{}\n{}\n".as_bytes()).unwrap(), 2);
        assert_eq!(count_records("{}\n{}".as_bytes()).unwrap(), 2);
    }
}
