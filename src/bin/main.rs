use clap::{App, AppSettings};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new("txhandler")
        .about("UTXO transaction validation and epoch settlement tools.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(txhandler_lib::commands::settle_command())
        .subcommand(txhandler_lib::commands::keygen_command())
        .get_matches();

    if let Some(ref matches) = matches.subcommand_matches("settle") {
        txhandler_lib::commands::run_settle_command(&matches)
    } else if let Some(ref matches) = matches.subcommand_matches("keygen") {
        txhandler_lib::commands::run_keygen_command(&matches)
    } else {
        Err("Unknown subcommand.".into())
    }
}
