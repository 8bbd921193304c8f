use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "todo-tui")]
#[command(about = "Terminal client for a daily task list")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run against the configured todo API (default)
    Run,
    /// Run with an in-memory backend and sample tasks (login: admin / pass)
    Dev,
    /// Sign in from the command line and save the session
    Login,
    /// Create an account from the command line
    Register,
    /// Remove the saved session
    Logout,
    /// Print config path and create default file if missing
    ConfigPath,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_the_default() {
        let cli = Cli::try_parse_from(["todo-tui"]).unwrap();
        assert_eq!(cli.command(), Commands::Run);
    }

    #[test]
    fn subcommands_are_kebab_case() {
        let cli = Cli::try_parse_from(["todo-tui", "config-path"]).unwrap();
        assert_eq!(cli.command(), Commands::ConfigPath);
    }
}
