// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod args;
mod logging;
mod source;

use crate::args::{CmdArgs, Parser};
use crate::logging::init_logging;
use crate::source::FragmentSource;

use config::ConversionParams;
use mgmt::frr::reload::FrrPaths;
use mgmt::processor::launch::{MgmtParams, start_mgmt};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

fn main() {
    /* parse cmd line args */
    let args = CmdArgs::parse();

    /* initialize logging */
    if let Err(e) = init_logging(args.log_level()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    info!("Starting BGP configuration agent...");

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received termination signal");
        stop.cancel();
    })
    .expect("failed to set termination handler");

    let conversion = ConversionParams::new(args.node_name(), args.log_level())
        .set_always_block(&args.always_block());
    let mut params = MgmtParams::new(FrrPaths::from_env(), conversion);
    params.reload_interval = args.reload_interval();
    params.retry_interval = args.retry_interval();
    params.status_interval = args.status_interval();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("bgpcfg")
        .enable_time()
        .build()
        .expect("Tokio runtime creation failed");

    runtime.block_on(async {
        let mgmt = start_mgmt(params, &cancel);
        let source = FragmentSource::new(args.fragments_dir(), mgmt.processor.clone());
        let source = tokio::spawn(source.run(cancel.clone(), args.rescan_interval()));

        cancel.cancelled().await;
        if let Err(e) = source.await {
            error!("Fragment source failed: {e}");
        }
        mgmt.join().await;
    });
    info!("Stopped");
}
