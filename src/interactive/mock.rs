use crate::error::Error;

/// Terminal abstraction so the prompt flows can be driven by tests.
#[cfg_attr(test, mockall::automock)]
pub trait Console {
    /// Write text without a trailing newline and flush it.
    fn write(&self, text: &str) -> Result<(), Error>;

    /// Write a full line.
    fn write_line(&self, text: &str) -> Result<(), Error>;

    /// Read one line of input.
    fn read_line(&self) -> Result<String, Error>;
}

/// Console backed by stdin/stdout.
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&self, text: &str) -> Result<(), Error> {
        use std::io::Write;
        print!("{text}");
        std::io::stdout().flush().map_err(Error::Io)
    }

    fn write_line(&self, text: &str) -> Result<(), Error> {
        println!("{text}");
        Ok(())
    }

    fn read_line(&self) -> Result<String, Error> {
        use std::io::BufRead;
        let stdin = std::io::stdin();
        let mut line = String::new();
        stdin.lock().read_line(&mut line).map_err(Error::Io)?;
        Ok(line)
    }
}
