use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::Setup;
use crate::machine::Machine;
use crate::{EnigmaError, Result};

/// Characters per output group.
pub const GROUP_WIDTH: usize = 5;

/// Runs every line of `input` through `machine`, writing results to `output`.
///
/// Lines starting with `*` reconfigure the machine. Lines holding only
/// whitespace are skipped. Every other line is a message, printed in groups
/// of [`GROUP_WIDTH`] characters; a message before the first setup line is
/// an error.
pub fn process<R: BufRead, W: Write>(machine: &mut Machine, input: R, mut output: W) -> Result<()> {
    let mut configured = false;
    for (n, line) in input.lines().enumerate() {
        let line = line?;
        if line.starts_with('*') {
            Setup::parse(&line, machine.num_rotors())?.apply(machine)?;
            configured = true;
        } else if !line.is_empty() && line.trim().is_empty() {
            continue;
        } else {
            if !configured {
                return Err(EnigmaError::ConfigError(format!(
                    "Message on line {} comes before any setup line",
                    n + 1
                )));
            }
            let converted = machine.convert_message(&line)?;
            writeln!(output, "{}", format_groups(&converted, GROUP_WIDTH))?;
        }
    }
    output.flush()?;
    debug!("input exhausted");
    Ok(())
}

/// Splits `msg` into space-separated groups of `width` characters; the last
/// group may be shorter.
pub fn format_groups(msg: &str, width: usize) -> String {
    let mut out = String::with_capacity(msg.len() + msg.len() / width.max(1));
    for (i, c) in msg.chars().enumerate() {
        if i > 0 && i % width.max(1) == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::read_machine;

    const SMALL: &str = "A-D\n4 3\n\
        R1 R (AC) (BD)\n\
        R2 MC (ABCD)\n\
        R3 MC (ABCD)\n\
        R4 MC (ABCD)\n";

    fn run(input: &str) -> Result<String> {
        let mut machine = read_machine(SMALL.as_bytes())?;
        let mut out = Vec::new();
        process(&mut machine, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_format_groups() {
        assert_eq!(format_groups("", 5), "");
        assert_eq!(format_groups("ABC", 5), "ABC");
        assert_eq!(format_groups("ABCDE", 5), "ABCDE");
        assert_eq!(format_groups("ABCDEFGHIJKL", 5), "ABCDE FGHIJ KL");
    }

    #[test]
    fn test_round_trip_through_driver() -> Result<()> {
        let cipher = run("* R1 R2 R3 R4 BCA (AD)\nabcd dcba\nAAAA\n")?;
        let lines: Vec<&str> = cipher.lines().collect();
        assert_eq!(lines.len(), 2);

        let joined = lines.join("\n");
        let plain = run(&format!("* R1 R2 R3 R4 BCA (AD)\n{joined}\n"))?;
        assert_eq!(plain, "ABCDD CBA\nAAAA\n");
        Ok(())
    }

    #[test]
    fn test_blank_lines() -> Result<()> {
        let out = run("* R1 R2 R3 R4 AAA\n   \n\nA\n")?;
        assert_eq!(out.lines().collect::<Vec<_>>().len(), 2);
        assert!(out.starts_with('\n'));
        Ok(())
    }

    #[test]
    fn test_message_before_setup_rejected() {
        assert!(matches!(run("ABCD\n"), Err(EnigmaError::ConfigError(_))));
    }

    #[test]
    fn test_bad_setup_reported() {
        assert!(run("* R1 R2 R3 NOPE AAA\nABCD\n").is_err());
        assert!(run("* R1 R2 R3 R4 AAA\nABCE\n").is_err());
    }
}
