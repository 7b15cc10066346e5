use clap::{Parser, Subcommand};

mod config;
pub use config::MessengerConfig;

mod keygen;
pub use keygen::KeygenArgs;

mod encrypt;
pub use encrypt::EncryptArgs;

mod decrypt;
pub use decrypt::DecryptArgs;

mod bind;
pub use bind::{BindArgs, ImportArgs};

mod primes;
pub use primes::PrimesArgs;

#[derive(Parser)]
#[command(name = "messenger", version = env!("MESSENGER_VERSION_INFO"))]
#[command(about = "textbook RSA key generation and message encryption")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "configuration file(json/json5), the `MESSENGER__*` environment variables take precedence"
    )]
    config: Option<String>,

    #[command(subcommand)]
    cmd: CliSubArgs,
}

#[derive(Subcommand)]
pub enum CliSubArgs {
    #[command(name = "keygen")]
    Keygen(KeygenArgs),
    #[command(name = "encrypt")]
    Encrypt(EncryptArgs),
    #[command(name = "decrypt")]
    Decrypt(DecryptArgs),
    #[command(name = "bind")]
    Bind(BindArgs),
    #[command(name = "import")]
    Import(ImportArgs),
    #[command(name = "primes")]
    Primes(PrimesArgs),
}

impl Cli {
    pub fn exe(self) -> anyhow::Result<()> {
        let cfg = MessengerConfig::config_with_file(self.config.as_deref());
        log::debug!("git info: {}", env!("MESSENGER_GIT_INFO"));

        match self.cmd {
            CliSubArgs::Keygen(a) => a.exe(cfg),
            CliSubArgs::Encrypt(a) => a.exe(cfg),
            CliSubArgs::Decrypt(a) => a.exe(cfg),
            CliSubArgs::Bind(a) => a.exe(cfg),
            CliSubArgs::Import(a) => a.exe(cfg),
            CliSubArgs::Primes(a) => a.exe(cfg),
        }
    }
}
