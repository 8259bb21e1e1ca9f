use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the SQLite database file.
    #[clap(long, env, default_value = "./classbook-data")]
    pub workspace: PathBuf,

    /// Secret the cookie signing key is derived from.
    #[clap(long, env, default_value = "dev-secret-change-me")]
    pub secret_key: String,

    /// TrueType font embedded into PDF reports; must cover Cyrillic.
    #[clap(
        long,
        env,
        default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
    )]
    pub report_font: PathBuf,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,

    /// Wipe the store and load the demo dataset before serving.
    #[clap(long, env, default_value_t = false)]
    pub seed_demo: bool,
}
