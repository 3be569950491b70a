//! Stream loops that surface every I/O error, `Interrupted` included.
//!
//! `Read::read_exact`, `Read::read_to_end` and `Write::write_all` retry
//! `ErrorKind::Interrupted` internally. A transport may use it to signal
//! cancellation, so these helpers fail on the first error instead and leave
//! the decision to the caller.

use crate::wire::error::{Error, Result};
use std::io::{self, Read, Write};

const CHUNK_SIZE: usize = 8 * 1024;

/// Appends everything up to end-of-stream to `buf`. Returns the byte count.
pub fn read_to_end<R: Read + ?Sized>(r: &mut R, buf: &mut Vec<u8>) -> Result<usize> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0;

    loop {
        match r.read(&mut chunk) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                total += n;
            }
            Err(e) => return Err(Error::Read(e)),
        }
    }
}

/// Fills `buf` completely, or fails with `UnexpectedEof` if the stream ends first.
pub fn read_exact<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;

    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stream ended early",
                )));
            }
            Ok(n) => filled += n,
            Err(e) => return Err(Error::Read(e)),
        }
    }

    Ok(())
}

/// Reads and drops `n` bytes.
pub fn discard<R: Read + ?Sized>(r: &mut R, n: u64) -> Result<()> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut left = n;

    while left > 0 {
        let want = left.min(CHUNK_SIZE as u64) as usize;
        let got = r.read(&mut chunk[..want]).map_err(Error::Read)?;
        if got == 0 {
            return Err(Error::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended early",
            )));
        }
        left -= got as u64;
    }

    Ok(())
}

/// Writes all of `buf`.
pub fn write_all<W: Write + ?Sized>(w: &mut W, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        match w.write(buf) {
            Ok(0) => return Err(Error::Write(io::Error::from(io::ErrorKind::WriteZero))),
            Ok(n) => buf = &buf[n..],
            Err(e) => return Err(Error::Write(e)),
        }
    }

    Ok(())
}
