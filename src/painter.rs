use anyhow::{bail, Result};
use crossterm::{cursor, queue, terminal};
use std::io::{IsTerminal, Stdout, Write};

pub struct Painter {
    stdout: Stdout,
    /// The number of lines output in the previous iteration
    n: usize,
}
impl Painter {
    pub fn new() -> Result<Painter> {
        let stdout = std::io::stdout();
        if !stdout.is_terminal() {
            bail!("Couldn't open stdout as a terminal");
        }
        Ok(Painter { stdout, n: 0 })
    }

    /// Clear the previous output and replace it with the new output
    pub fn print(&mut self, out: &[u8]) -> Result<()> {
        let mut stdout = self.stdout.lock();
        for _ in 0..self.n {
            queue!(
                stdout,
                cursor::MoveUp(1),
                terminal::Clear(terminal::ClearType::CurrentLine)
            )?;
        }
        stdout.write_all(out)?;
        stdout.flush()?;
        self.n = out.iter().filter(|c| **c == b'\n').count();
        Ok(())
    }
}
