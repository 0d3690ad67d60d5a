use std::io::{self, Write};

/// Writes one line to stdout. A closed pipe (`recur-scan features x | head`)
/// is not an error.
pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_tolerating_broken_pipe(&mut stdout, text)
}

fn write_tolerating_broken_pipe(writer: &mut dyn Write, text: &str) -> io::Result<()> {
    let result = writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush());
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::write_tolerating_broken_pipe;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_pipe_is_swallowed() {
        assert!(write_tolerating_broken_pipe(&mut ClosedPipe, "row").is_ok());
    }

    #[test]
    fn appends_newline() {
        let mut buffer = Vec::new();
        assert!(write_tolerating_broken_pipe(&mut buffer, "row").is_ok());
        assert_eq!(buffer, b"row\n");
    }
}
