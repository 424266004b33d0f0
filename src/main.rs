// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use sibling_prep::{cli, config, install, ui};

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Resolve everything into an immutable plan
    let plan = match config::build_plan(&args) {
        Ok(p) => p,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    ui::status(&format!(
        "preparing workspace for {} in {}",
        plan.project_name,
        plan.workspace_dir.display()
    ));

    // Run the pipeline; any step's failure aborts the run
    match install::prepare(&plan) {
        Ok(outcome) => {
            ui::print_outcome(&outcome);
            std::process::exit(0);
        }
        Err(e) => {
            ui::print_error(&e);
            std::process::exit(1);
        }
    }
}
