use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat about what's playing, with movie lookups", long_about = None)]
pub struct Args {
    /// Ask a single question instead of starting an interactive chat
    pub query: Option<String>,

    /// Model to use for completions
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in each reply
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Seconds to wait for a complete reply
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
