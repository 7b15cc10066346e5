use std::fmt::Write;

use cipher::rsa::PrimeSearch;
use clap::{value_parser, Args};
use num_bigint::BigUint;

use super::MessengerConfig;

#[derive(Args, Clone)]
#[command(about = "search distinct probable primes concurrently")]
pub struct PrimesArgs {
    #[arg(value_name = "BYTES", value_parser = value_parser!(u32).range(1..))]
    #[arg(help = "the byte length of the candidates")]
    bytes: u32,

    #[arg(short, long, default_value = "1")]
    #[arg(help = "the number of primes to find")]
    count: usize,

    #[arg(short, long, help = "search threads, use the configured `threads` if not specified")]
    threads: Option<usize>,

    #[arg(long = "0x", help = "display with prefix 0x")]
    prefix: bool,
}

impl PrimesArgs {
    pub fn run(&self, cfg: &MessengerConfig) -> anyhow::Result<Vec<BigUint>> {
        let primes = PrimeSearch::new(self.bytes as usize, self.count)
            .threads(self.threads.unwrap_or(cfg.threads))
            .test_rounds(cfg.prime_test_rounds)
            .search()?;

        Ok(primes)
    }

    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        let primes = self.run(cfg)?;

        let mut s = String::with_capacity(primes.len() * (self.bytes as usize * 2 + 3));
        for p in primes {
            if self.prefix {
                writeln!(s, "{p:#x}")?;
            } else {
                writeln!(s, "{p:x}")?;
            }
        }
        print!("{s}");

        Ok(())
    }
}
