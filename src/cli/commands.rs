use clap::Subcommand;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new account
    Add {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username for the new account
        #[arg(long)]
        username: Option<String>,

        /// Display name
        #[arg(long)]
        full_name: Option<String>,

        /// Role: staff or student
        #[arg(long)]
        role: Option<String>,

        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,

        /// Skip interactive prompts (requires every other flag)
        #[arg(long)]
        non_interactive: bool,
    },
}
