// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use glint::config;
use glint::management::Management;
use glint::theatre::{FixtureType, StockFixture};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A live lighting mixing engine."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the engine with the given configuration.
    Run {
        /// The path to the engine config.
        config_path: String,
        /// Stop after this many seconds. Runs until killed otherwise.
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Lists the built-in fixture types and their functions.
    FixtureTypes {},
    /// Loads and validates a configuration, then prints the patch.
    Verify {
        /// The path to the engine config.
        config_path: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config_path,
            seconds,
        } => {
            let engine = config::load(&PathBuf::from(config_path))?;
            let management = config::init_engine(&engine)?;
            management.run()?;
            match seconds {
                Some(seconds) => {
                    thread::sleep(Duration::from_secs(seconds));
                    management.stop();
                    info!(seconds, "Engine stopped.");
                }
                None => loop {
                    thread::park();
                },
            }
        }
        Commands::FixtureTypes {} => {
            println!("Fixture types:");
            for stock in StockFixture::ALL {
                let fixture_type = FixtureType::stock(stock);
                let functions = fixture_type
                    .functions()
                    .iter()
                    .map(|function| {
                        if function.is_16_bit {
                            format!("{} (16-bit)", function.function_type)
                        } else {
                            function.function_type.to_string()
                        }
                    })
                    .collect::<Vec<String>>()
                    .join(", ");
                println!(
                    "- {} ({} channels): {}",
                    fixture_type.name(),
                    fixture_type.channel_span(),
                    functions
                );
            }
        }
        Commands::Verify { config_path } => {
            let engine = config::load(&PathBuf::from(config_path))?;
            let management = config::verify(&engine)?;
            print_patch(&management);
        }
    }

    Ok(())
}

fn print_patch(management: &Management) {
    let show = management.show();
    let theatre = show.theatre();
    println!("Universes: {}", show.n_universes());
    println!("Fixtures (count: {}):", theatre.fixture_count());
    for (_, fixture) in theatre.fixtures() {
        let type_name = theatre
            .fixture_type(fixture.fixture_type())
            .map_or("?", |fixture_type| fixture_type.name());
        println!(
            "- {}: {} at universe {}, channel {}",
            fixture.name(),
            type_name,
            fixture.universe(),
            fixture.first_channel() + 1
        );
    }
    println!("Source values: {}", show.source_value_count());
    for universe in 0..show.n_universes() {
        println!(
            "Universe {}: next free channel {}",
            universe,
            theatre.first_free_channel(universe) + 1
        );
    }
}
