//! Line framing and dot-stuffing, shared by the server-side Protocol Engine
//! and the client-side connections the Peer Synchronizer opens outbound.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed before a complete line was read")]
    UnexpectedEof,
}

/// Read a single line, stripping a trailing CRLF or bare LF. Readers must
/// tolerate peers that send bare LF even though this node always writes
/// CRLF.
///
/// # Errors
///
/// Returns `UnexpectedEof` if the peer closes the connection without
/// sending a newline-terminated line.
pub async fn read_line<R>(reader: &mut R) -> Result<String, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = String::new();
    let n = reader.read_line(&mut raw).await?;
    if n == 0 {
        return Err(FramingError::UnexpectedEof);
    }
    while raw.ends_with('\n') || raw.ends_with('\r') {
        raw.pop();
    }
    Ok(raw)
}

/// Write a single line terminated with CRLF.
///
/// # Errors
///
/// Propagates the underlying `std::io::Error`.
pub async fn write_line<W>(writer: &mut W, line: &str) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    Ok(())
}

/// Read a dot-terminated multi-line block (as used by article bodies,
/// `LIST`, `NEWGROUPS`/`NEWNEWS` responses, and `IHAVE`/`POST` transfers).
/// The terminating lone-`.` line is consumed but not returned. Lines
/// beginning with an extra leading `.` (dot-stuffed) are unstuffed by
/// removing exactly one leading dot.
///
/// # Errors
///
/// Returns `UnexpectedEof` if the connection closes before the terminator.
pub async fn read_dot_terminated<R>(reader: &mut R) -> Result<Vec<String>, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let line = read_line(reader).await?;
        if line == "." {
            return Ok(lines);
        }
        if let Some(unstuffed) = line.strip_prefix('.') {
            lines.push(unstuffed.to_string());
        } else {
            lines.push(line);
        }
    }
}

/// Write a dot-terminated multi-line block: each line is dot-stuffed (a
/// line beginning with `.` gets one extra `.` prepended) and CRLF-terminated,
/// followed by the lone-`.` terminator line.
///
/// # Errors
///
/// Propagates the underlying `std::io::Error`.
pub async fn write_dot_terminated<W>(writer: &mut W, lines: &[String]) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    for line in lines {
        if line.starts_with('.') {
            write_line(writer, &format!(".{line}")).await?;
        } else {
            write_line(writer, line).await?;
        }
    }
    write_line(writer, ".").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn read_line_strips_crlf() {
        let mut reader = BufReader::new(b"hello\r\nworld\n".as_slice());
        assert_eq!(read_line(&mut reader).await.unwrap(), "hello");
        assert_eq!(read_line(&mut reader).await.unwrap(), "world");
    }

    #[tokio::test]
    async fn read_line_on_empty_stream_is_eof() {
        let mut reader = BufReader::new(b"".as_slice());
        assert!(matches!(
            read_line(&mut reader).await,
            Err(FramingError::UnexpectedEof)
        ));
    }

    #[tokio::test]
    async fn write_line_appends_crlf() {
        let mut buf = Vec::new();
        write_line(&mut buf, "200 ready").await.unwrap();
        assert_eq!(buf, b"200 ready\r\n");
    }

    #[tokio::test]
    async fn dot_terminated_round_trip_unstuffs_leading_dots() {
        let mut buf = Vec::new();
        let lines = vec!["normal".to_string(), ".leading-dot".to_string(), "..two".to_string()];
        write_dot_terminated(&mut buf, &lines).await.unwrap();
        let mut reader = BufReader::new(buf.as_slice());
        let read_back = read_dot_terminated(&mut reader).await.unwrap();
        assert_eq!(read_back, lines);
    }

    #[tokio::test]
    async fn lone_dot_terminates_the_block() {
        let mut reader = BufReader::new(b"line one\r\n.\r\nnot part of block\r\n".as_slice());
        let lines = read_dot_terminated(&mut reader).await.unwrap();
        assert_eq!(lines, vec!["line one".to_string()]);
    }

    #[tokio::test]
    async fn missing_terminator_is_unexpected_eof() {
        let mut reader = BufReader::new(b"line one\r\n".as_slice());
        assert!(matches!(
            read_dot_terminated(&mut reader).await,
            Err(FramingError::UnexpectedEof)
        ));
    }
}
