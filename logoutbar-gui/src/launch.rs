use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// A button command split into environment additions, program and arguments.
///
/// Commands follow desktop-entry conventions loosely: anything from the first
/// `%` field code onwards is dropped, and leading `KEY=VALUE` words are
/// exported to the child instead of being run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub env: Vec<(String, String)>,
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn parse(command: &str) -> Result<Self> {
        let command = match command.find('%') {
            Some(cut) => &command[..cut],
            None => command,
        };

        let mut words = command.split_whitespace().peekable();

        let mut env = Vec::new();
        while let Some((key, value)) = words.peek().and_then(|word| split_assignment(word)) {
            env.push((key.to_string(), value.to_string()));
            words.next();
        }

        let Some(program) = words.next() else {
            bail!("No program in command '{}'", command.trim());
        };

        Ok(Self {
            env,
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    /// Start the command without waiting for it.
    pub fn spawn(&self) -> Result<u32> {
        debug!(
            "env vars: {:?}; command: '{}'; args: {:?}",
            self.env, self.program, self.args
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start '{}'", self.program))?;

        let pid = child.id();
        info!("Launched '{}' (pid {})", self.program, pid);
        Ok(pid)
    }
}

fn split_assignment(word: &str) -> Option<(&str, &str)> {
    let (key, value) = word.split_once('=')?;
    let valid_key = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.starts_with(|c: char| c.is_ascii_digit());
    valid_key.then_some((key, value))
}

/// Parse and start `command`.
pub fn launch(command: &str) -> Result<u32> {
    LaunchCommand::parse(command)?.spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_program_args_and_field_code() {
        let cmd = LaunchCommand::parse("FOO=1 BAR=2 mycommand --flag %U").unwrap();
        assert_eq!(
            cmd.env,
            vec![("FOO".to_string(), "1".to_string()), ("BAR".to_string(), "2".to_string())]
        );
        assert_eq!(cmd.program, "mycommand");
        assert_eq!(cmd.args, vec!["--flag".to_string()]);
    }

    #[test]
    fn test_plain_command() {
        let cmd = LaunchCommand::parse("systemctl -i poweroff").unwrap();
        assert!(cmd.env.is_empty());
        assert_eq!(cmd.program, "systemctl");
        assert_eq!(cmd.args, vec!["-i", "poweroff"]);
    }

    #[test]
    fn test_assignment_after_program_is_an_argument() {
        let cmd = LaunchCommand::parse("env LANG=C foo").unwrap();
        assert!(cmd.env.is_empty());
        assert_eq!(cmd.program, "env");
        assert_eq!(cmd.args, vec!["LANG=C", "foo"]);
    }

    #[test]
    fn test_hash_colors_survive() {
        let cmd =
            LaunchCommand::parse("waylock --init-color #222222 --input-color #4c7899").unwrap();
        assert_eq!(cmd.program, "waylock");
        assert_eq!(cmd.args.len(), 4);
        assert_eq!(cmd.args[1], "#222222");
    }

    #[test]
    fn test_repeated_whitespace() {
        let cmd = LaunchCommand::parse("  swaymsg   exit  ").unwrap();
        assert_eq!(cmd.program, "swaymsg");
        assert_eq!(cmd.args, vec!["exit"]);
    }

    #[test]
    fn test_field_code_without_space() {
        let cmd = LaunchCommand::parse("viewer --open%f").unwrap();
        assert_eq!(cmd.args, vec!["--open"]);
    }

    #[test]
    fn test_empty_commands_rejected() {
        assert!(LaunchCommand::parse("").is_err());
        assert!(LaunchCommand::parse("   ").is_err());
        assert!(LaunchCommand::parse("%U").is_err());
        assert!(LaunchCommand::parse("FOO=1 BAR=2").is_err());
    }

    #[test]
    fn test_not_an_assignment() {
        let cmd = LaunchCommand::parse("=oops run").unwrap();
        assert!(cmd.env.is_empty());
        assert_eq!(cmd.program, "=oops");
    }
}
