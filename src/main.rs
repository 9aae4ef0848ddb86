//! kubectx-manager binary entry point.
//!
//! Parses arguments, initializes logging, and dispatches to the cleanup or
//! restore flow. Any error is logged and mapped to exit code 1.

use clap::Parser;
use tracing::error;

use kubectx_manager::cli::{Cli, Command};
use kubectx_manager::prompt::StdioPrompter;
use kubectx_manager::{CleanupOptions, RestoreOptions, run_cleanup, run_restore};

fn main() {
    let cli = Cli::parse();
    kubectx_manager::logging::init(cli.verbose, cli.quiet);

    let mut prompter = StdioPrompter::stdin();

    let result = match &cli.command {
        Some(Command::Restore(args)) => {
            let options = RestoreOptions {
                kubeconfig: args.kubeconfig_path(),
                no_backup: args.no_backup,
                keep_backup: args.keep_backup,
            };
            run_restore(&options, &mut prompter)
        }
        None => {
            let options = CleanupOptions {
                config: cli.config_path(),
                kubeconfig: cli.kubeconfig_path(),
                dry_run: cli.dry_run,
                auth_check: cli.auth_check,
                interactive: cli.interactive,
            };
            run_cleanup(&options, &mut prompter)
        }
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}
