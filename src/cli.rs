use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fruitbot", about = "Telegram bot nhận diện trái cây và tra cứu giá", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bot (default)
    Run,

    /// Create the catalog database and insert the ten sample fruits
    Seed,
}
