use clap::builder::PossibleValue;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Address to bind the API server on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the API server on
    #[arg(short, long, default_value = "8787")]
    pub port: u16,

    /// Logging level
    #[arg(long = "log", default_value = "info",
        value_parser([
            PossibleValue::new("debug"),
            PossibleValue::new("info"),
            PossibleValue::new("warn"),
            PossibleValue::new("error")
        ])
    )]
    pub log_level: String,
}
