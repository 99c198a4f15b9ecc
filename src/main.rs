use jsonschema_hive::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();

    let default_filter = if command_line_interface.verbose {
        "jsonschema_hive=debug"
    } else {
        "jsonschema_hive=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    command_line_interface.run()
}
