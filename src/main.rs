use clap::Parser;
use juno::{
    init_logging, App, Cli, Command, Environment, Platform, SettingsError, BUILD_DATE, VERSION,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    let base = match cli.workdir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let app = App::new(Platform::current(), Environment::capture(), base);

    let result = match cli.command() {
        Command::Run => app.run(),
        Command::Detect { json } => app.detect(json),
        Command::Config { path } => app.config(path),
        Command::Flash { port } => app.flash(port),
        Command::Monitor { port } => app.session(port.as_deref()),
        Command::Version => {
            println!("juno {VERSION} (built {BUILD_DATE})");
            Ok(())
        }
    };

    if let Err(err) = &result {
        let resolution = err
            .downcast_ref::<SettingsError>()
            .and_then(SettingsError::as_resolution);
        if let Some(resolution) = resolution {
            eprintln!("{}", resolution.diagnostic());
            std::process::exit(1);
        }
    }
    result
}
