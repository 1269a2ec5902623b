//! Interactive GSQL prompt.

use std::io::{BufRead, Write};

use crate::error::GsqlError;
use crate::session::Session;
use crate::transport::Transport;

/// Prompt shown before each command.
pub const PROMPT: &str = "GSQL > ";

/// Whether the input asks to leave the prompt.
#[must_use]
pub fn is_exit_command(command: &str) -> bool {
    command.eq_ignore_ascii_case("quit") || command.eq_ignore_ascii_case("exit")
}

/// Read commands from `input` and execute them until `quit`/`exit` or end
/// of input.
///
/// Command failures are reported on `out` and do not end the loop.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run<T, R, W>(session: &mut Session<T>, mut input: R, out: &mut W) -> Result<(), GsqlError>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }

        let command = line.trim();
        if is_exit_command(command) {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }
        if command.is_empty() {
            continue;
        }

        if let Err(e) = session.execute(command, out).await {
            writeln!(out, "Error executing command: {e}")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ServerTarget;
    use crate::testing::{Reply, ScriptedTransport, is_login};
    use serde_json::json;
    use test_case::test_case;

    fn session() -> Session<ScriptedTransport> {
        let transport = ScriptedTransport::new(|req| {
            if is_login(req) {
                Ok(Reply::json(&json!({"isClientCompatible": true, "error": false})))
            } else if req.body == "fail" {
                Err(GsqlError::Transport("connection refused".into()))
            } else {
                let output = format!("ran {}\n", req.body);
                Ok(Reply::chunks(&[output.as_str()]))
            }
        });
        Session::new(ServerTarget::new("http://h", "14240", "u", "p"), transport)
    }

    fn forwarded(session: &Session<ScriptedTransport>) -> Vec<String> {
        session
            .transport()
            .requests()
            .into_iter()
            .filter(|r| !is_login(r))
            .map(|r| r.body)
            .collect()
    }

    #[test_case("quit" ; "lower quit")]
    #[test_case("Quit" ; "title quit")]
    #[test_case("QUIT" ; "upper quit")]
    #[test_case("exit" ; "lower exit")]
    #[test_case("Exit" ; "title exit")]
    #[test_case("  eXiT  " ; "padded mixed exit")]
    #[tokio::test]
    async fn exit_commands_end_the_loop_without_forwarding(line: &str) {
        let mut session = session();
        session.login(&mut Vec::new()).await.expect("login");

        let input = format!("{line}\nls\n");
        let mut out = Vec::new();
        run(&mut session, input.as_bytes(), &mut out).await.expect("repl");

        assert!(forwarded(&session).is_empty());
        let shown = String::from_utf8(out).expect("utf8");
        assert_eq!(shown, "GSQL > Goodbye!\n");
    }

    #[tokio::test]
    async fn blank_lines_reprompt_without_forwarding() {
        let mut session = session();
        session.login(&mut Vec::new()).await.expect("login");

        let mut out = Vec::new();
        run(&mut session, "\n   \n\t\nquit\n".as_bytes(), &mut out)
            .await
            .expect("repl");

        assert!(forwarded(&session).is_empty());
        let shown = String::from_utf8(out).expect("utf8");
        assert_eq!(shown.matches(PROMPT).count(), 4);
    }

    #[tokio::test]
    async fn commands_are_trimmed_and_forwarded_in_order() {
        let mut session = session();
        session.login(&mut Vec::new()).await.expect("login");

        let mut out = Vec::new();
        run(&mut session, "  ls \nUSE GRAPH social\nexit\n".as_bytes(), &mut out)
            .await
            .expect("repl");

        assert_eq!(forwarded(&session), vec!["ls", "USE GRAPH social"]);
        let shown = String::from_utf8(out).expect("utf8");
        assert!(shown.contains("ran ls\n"));
        assert!(shown.contains("ran USE GRAPH social\n"));
    }

    #[tokio::test]
    async fn command_errors_are_reported_and_loop_continues() {
        let mut session = session();
        session.login(&mut Vec::new()).await.expect("login");

        let mut out = Vec::new();
        run(&mut session, "fail\nls\nquit\n".as_bytes(), &mut out)
            .await
            .expect("repl");

        let shown = String::from_utf8(out).expect("utf8");
        assert!(shown.contains("Error executing command: transport error: connection refused"));
        assert!(shown.contains("ran ls\n"));
        assert_eq!(forwarded(&session), vec!["fail", "ls"]);
    }

    #[tokio::test]
    async fn end_of_input_ends_the_loop() {
        let mut session = session();
        session.login(&mut Vec::new()).await.expect("login");

        let mut out = Vec::new();
        run(&mut session, "ls\n".as_bytes(), &mut out).await.expect("repl");

        assert_eq!(forwarded(&session), vec!["ls"]);
        assert!(String::from_utf8(out).expect("utf8").ends_with("Goodbye!\n"));
    }

    #[test_case("quit", true ; "quit")]
    #[test_case("exit", true ; "exit")]
    #[test_case("quitting", false ; "prefix only")]
    #[test_case("", false ; "empty")]
    #[test_case("ls", false ; "command")]
    fn exit_detection(command: &str, expected: bool) {
        assert_eq!(is_exit_command(command), expected);
    }
}
