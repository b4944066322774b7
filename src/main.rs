// Copyright (C) 2026 The ubxdump developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};
use ubxdump::{SerialConnector, Setting, Settings, is_help_token, render};

/// Stream the parsed UBX output of a u-blox GNSS device
#[derive(Debug, Parser)]
#[command(name = "ubxdump", disable_help_flag = true)]
struct Arguments {
    /// `key=value` settings: port, baud, timeout, ubx_only, raw
    settings: Vec<Setting>,
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    if std::env::args().nth(1).is_some_and(|arg| is_help_token(&arg)) {
        println!("{}", render::USAGE);
        return Ok(());
    }

    let args = Arguments::parse();
    let settings = Settings::from_settings(args.settings);
    debug!("Settings: {:#?}", settings);

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
        .context("Failed to install the Ctrl-C handler")?;

    let termination = ubxdump::run(
        &settings,
        &SerialConnector,
        &interrupted,
        &mut io::stdout().lock(),
    )
    .with_context(|| format!("Streaming from {} failed", settings.port))?;
    debug!("Streaming finished: {:?}", termination);

    Ok(())
}
