//! Running the external collaborators.

use eyre::{Result, WrapErr, bail};
use std::io::Write;
use std::process::{Command, Stdio};

/// Run `program args..` with `input` on stdin and return its stdout.
///
/// Stderr is passed through to the user. A non-zero exit is an error.
pub fn capture(program: &str, args: &[&str], input: &str) -> Result<String> {
    let invocation = format!("{program} {}", args.join(" "));
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .wrap_err_with(|| format!("failed to run {invocation}"))?;

    // Written from a thread: the child may fill stdout before it has read
    // all of stdin.
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| eyre::eyre!("stdin of {invocation} is not piped"))?;
    let input = input.to_owned();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let out = child
        .wait_with_output()
        .wrap_err_with(|| format!("failed to wait for {invocation}"))?;
    let written = writer.join();
    if !out.status.success() {
        bail!("{invocation} failed with {}", out.status);
    }
    match written {
        Ok(result) => result.wrap_err_with(|| format!("failed to write to {invocation}"))?,
        Err(_) => bail!("stdin writer for {invocation} panicked"),
    }

    String::from_utf8(out.stdout)
        .wrap_err_with(|| format!("{invocation} output is not valid UTF-8"))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn stdin_round_trips_through_cat() {
        assert_eq!(capture("cat", &[], "héllo\n").unwrap(), "héllo\n");
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let error = capture("false", &[], "").unwrap_err();
        assert!(error.to_string().contains("false"));
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(capture("blueprint-convert-no-such-program", &[], "").is_err());
    }
}
