//! Line oriented interactive terminal: prompts, confirmations and plain
//! output over any reader/writer pair, so that wizard steps can be driven by
//! scripted input in tests.

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Input was closed (end of file) while waiting for an answer.
    InputClosed,
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::InputClosed => None,
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(_) => write!(f, "terminal I/O failed"),
            Error::InputClosed => write!(f, "input closed"),
        }
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub struct Terminal<R: std::io::BufRead, W: std::io::Write> {
    input: R,
    output: W,
    /// Whether to clear the screen between steps.
    clear: bool,
}

impl Terminal<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Terminal over the process's standard streams.
    pub fn stdio() -> Self {
        return Self {
            input: std::io::stdin().lock(),
            output: std::io::stdout(),
            clear: console::user_attended(),
        };
    }
}

impl<R: std::io::BufRead, W: std::io::Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        return Self {
            input,
            output,
            clear: false,
        };
    }

    pub fn into_output(self) -> W {
        return self.output;
    }

    /// Print a line.
    pub fn say(&mut self, line: impl std::fmt::Display) -> Result<(), Error> {
        writeln!(self.output, "{line}")?;
        return Ok(());
    }

    pub fn blank(&mut self) -> Result<(), Error> {
        return self.say("");
    }

    pub fn clear_screen(&mut self) -> Result<(), Error> {
        if self.clear {
            write!(self.output, "\x1b[2J\x1b[1;1H")?;
            self.output.flush()?;
        }
        return Ok(());
    }

    /// One trimmed line of input. Bytes that are not UTF-8 become U+FFFD so
    /// that the answer fails validation instead of the read.
    fn read_line(&mut self) -> Result<String, Error> {
        self.output.flush()?;
        let mut raw: Vec<u8> = Vec::new();
        let bytes_read: usize = self.input.read_until(b'\n', &mut raw)?;
        if bytes_read == 0 {
            return Err(Error::InputClosed);
        }
        return Ok(String::from_utf8_lossy(&raw).trim().to_string());
    }

    /// Ask for free text. An empty answer yields `default` when one is given.
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String, Error> {
        match default {
            Some(default) => write!(
                self.output,
                "{} {}: ",
                console::style(question).yellow(),
                console::style(format!("({default})")).cyan()
            )?,
            None => write!(self.output, "{}: ", console::style(question).yellow())?,
        }
        let answer: String = self.read_line()?;
        if answer.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        return Ok(answer);
    }

    /// Ask a yes/no question, repeating until the answer is understood.
    pub fn confirm(&mut self, question: &str, default: Option<bool>) -> Result<bool, Error> {
        let choices: &str = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        loop {
            write!(
                self.output,
                "{} {}: ",
                console::style(question).yellow(),
                console::style(choices).magenta()
            )?;
            let answer: String = self.read_line()?.to_ascii_lowercase();
            match (answer.as_str(), default) {
                ("y" | "yes", _) => return Ok(true),
                ("n" | "no", _) => return Ok(false),
                ("", Some(default)) => return Ok(default),
                _ => self.say(console::style("Please enter Y or N").red())?,
            }
        }
    }

    /// Wait for the user to press Enter.
    pub fn pause(&mut self, message: &str) -> Result<(), Error> {
        write!(self.output, "{}", console::style(message).cyan())?;
        self.read_line()?;
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(input: &str) -> Terminal<std::io::Cursor<Vec<u8>>, Vec<u8>> {
        return Terminal::new(std::io::Cursor::new(input.as_bytes().to_vec()), Vec::new());
    }

    #[test]
    fn test_ask_uses_default_on_empty_answer() {
        let mut term = terminal("\n  typed  \n");
        assert_eq!(term.ask("Port", Some("8303")).unwrap(), "8303");
        assert_eq!(term.ask("Name", None).unwrap(), "typed");
    }

    #[test]
    fn test_confirm_repeats_until_understood() {
        let mut term = terminal("maybe\nYES\n\n");
        assert!(term.confirm("Continue?", None).unwrap());
        assert!(!term.confirm("Continue?", Some(false)).unwrap());
        let output: String = String::from_utf8(term.into_output()).unwrap();
        assert!(output.contains("Please enter Y or N"));
    }

    #[test]
    fn test_non_utf8_input_is_replaced() {
        let mut term: Terminal<std::io::Cursor<Vec<u8>>, Vec<u8>> = Terminal::new(
            std::io::Cursor::new(b"caf\xe9\nnext\n".to_vec()),
            Vec::new(),
        );
        assert_eq!(term.ask("Name", None).unwrap(), "caf\u{FFFD}");
        assert_eq!(term.ask("Name", None).unwrap(), "next");
    }

    #[test]
    fn test_closed_input_is_reported() {
        let mut term = terminal("");
        match term.ask("Name", None) {
            Err(Error::InputClosed) => {}
            _ => panic!("expected error InputClosed"),
        }
    }
}
