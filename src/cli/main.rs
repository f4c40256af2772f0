//-
// Copyright (c) 2026, the Corral authors
//
// This file is part of Corral.
//
// Corral is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Corral is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Corral. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{error, warn};
use structopt::StructOpt;

use super::expand::StreamUnarchiver;
use super::render::{JsonLinesRenderer, TextRenderer};
use crate::pipeline::{self, MessageSink, Pipeline};
use crate::support::error::Error;
use crate::support::sysexits::*;

/// Normalise message archives into one canonical record stream.
///
/// Each input is classified by content (mbox, JSON status lines, gzip) or,
/// failing that, by its name (*.json/*.jsonl, *.dat Hamster stores,
/// otherwise a single news article), and every message it contains is
/// printed as one record.
#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
struct Options {
    /// Emit records as JSON lines instead of readable text.
    #[structopt(long)]
    json: bool,

    /// Process Hamster records flagged as deleted instead of skipping them.
    #[structopt(long)]
    keep_deleted: bool,

    /// Strip only a single level of ">From " quoting in mbox bodies.
    #[structopt(long)]
    single_level_unquote: bool,

    /// Increase log verbosity. Can be passed up to three times.
    #[structopt(short, parse(from_occurrences))]
    verbose: u32,

    /// The files to ingest. "-" will read from stdin.
    #[structopt(parse(from_os_str), default_value = "-")]
    inputs: Vec<PathBuf>,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Options::from_clap(&match Options::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        },
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        },
    });

    init_logging(cmd.verbose);

    let options = pipeline::Options {
        mbox_high_level_unquoting: !cmd.single_level_unquote,
        hamster_skip_deleted: !cmd.keep_deleted,
        ..pipeline::Options::default()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut sink: Box<dyn MessageSink + '_> = if cmd.json {
        Box::new(JsonLinesRenderer::new(&mut out))
    } else {
        Box::new(TextRenderer::new(&mut out))
    };

    let mut status = None::<Sysexit>;
    for input in &cmd.inputs {
        if let Err(e) = run_one(input, options, &mut *sink) {
            let failure = match e {
                Error::Io(ref e) if io::ErrorKind::NotFound == e.kind() => {
                    EX_NOINPUT
                },
                Error::Io(_) => EX_IOERR,
                _ => EX_DATAERR,
            };
            // Unusable content is routine for bulk ingestion; only I/O
            // failures are errors proper
            if EX_DATAERR == failure {
                warn!("Skipping {}: {}", input.display(), e);
            } else {
                error!("Unable to process {}: {}", input.display(), e);
            }
            status = Some(status.map_or(failure, |s| s.max(failure)));
        }
    }

    if let Some(status) = status {
        status.exit();
    }
}

fn run_one(
    input: &Path,
    options: pipeline::Options,
    sink: &mut dyn MessageSink,
) -> Result<(), Error> {
    let (name, reader): (String, Box<dyn Read>) = if Path::new("-") == input {
        ("stdin".to_owned(), Box::new(io::stdin()))
    } else {
        (
            input.to_string_lossy().into_owned(),
            Box::new(fs::File::open(input)?),
        )
    };

    let unarchiver = StreamUnarchiver;
    Pipeline::new(sink)
        .with_unarchiver(&unarchiver)
        .with_options(options)
        .run(&name, reader)
}

fn init_logging(verbosity: u32) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Errors here just mean a logger is already installed
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply();
}
