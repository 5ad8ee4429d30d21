use crate::PrivateKey;
use clap::{App, Arg, ArgMatches};
use std::error::Error;

pub struct KeygenCliOptions {
    seed: [u8; 32],
}

impl KeygenCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let seed = matches.value_of("seed").ok_or("Missing --seed")?;
        Ok(Self {
            seed: parse_seed(seed)?,
        })
    }
}

fn parse_seed(s: &str) -> Result<[u8; 32], Box<dyn Error>> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(format!("Seed must be 32 bytes, got: {}", bytes.len()).into());
    }
    let mut seed = [0; 32];
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

pub fn keygen_command() -> App<'static> {
    App::new("keygen")
        .version("0.1")
        .about("Prints the public key derived from a 32-byte seed.")
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("HEX")
                .help("Hex-encoded 32-byte Ed25519 seed.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_keygen_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = KeygenCliOptions::parse(matches)?;
    println!("{}", PrivateKey::from_seed(&options.seed).public_key());
    Ok(())
}
