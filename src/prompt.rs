use std::io::{self, BufRead, Write};

const WARNING: &str =
    "WARNING: this will kill every running browser session before each fund is fetched.";

/// Ask until the answer is `yes` or `no` (any case). End of input counts as `no`.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
    writeln!(output, "{}", WARNING)?;
    loop {
        write!(output, "Continue? (yes/no): ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "yes" => return Ok(true),
            "no" => return Ok(false),
            _ => writeln!(output, "Please answer yes or no.")?,
        }
    }
}
