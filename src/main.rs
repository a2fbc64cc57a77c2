use clap::Parser;
use form_relay::cli::commands::{cmd_id, cmd_schema, cmd_submit, cmd_validate, endpoints_for};
use form_relay::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    // Resolve endpoints: CLI > config > env
    let endpoints = endpoints_for(
        cli.webhook_url.as_deref(),
        cli.form_post_url.as_deref(),
        &config,
    );

    match cli.command {
        Commands::Submit {
            form,
            fields,
            input,
            no_wait,
        } => {
            let ok = cmd_submit(
                &form,
                &fields,
                input.as_deref(),
                !no_wait,
                &endpoints,
                &config,
                cli.verbose,
            )?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Validate {
            form,
            fields,
            input,
        } => {
            if !cmd_validate(&form, &fields, input.as_deref())? {
                std::process::exit(1);
            }
        }
        Commands::Id { count } => cmd_id(count),
        Commands::Schema { form } => cmd_schema(&form)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
