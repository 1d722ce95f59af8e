use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Token and session lifecycle host")]
pub struct Cli {
    /// Path to the settings file
    #[arg(long)]
    pub settings: Option<String>,
}
