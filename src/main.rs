use clap::Parser;

use geoguard::cli::{Cli, Commands, ConfigCommands};
use geoguard::config::{get_config, init_config};
use geoguard::errors::GeoGuardError;
use geoguard::runtime::modes;
use geoguard::system::{init_logging, install_panic_hook};

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<GeoGuardError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_config(cli.config.as_deref())?;

    match cli.command {
        #[cfg(feature = "geo")]
        None | Some(Commands::Geo) => {
            install_panic_hook("geo");
            let _guard = init_logging(&get_config().logging)?;
            modes::run_geo_server().await
        }
        #[cfg(not(feature = "geo"))]
        None => anyhow::bail!("no command given; the geo service is not compiled in"),
        #[cfg(feature = "image")]
        Some(Commands::Image) => {
            install_panic_hook("image");
            let _guard = init_logging(&get_config().logging)?;
            modes::run_image_server().await
        }
        #[cfg(feature = "image")]
        Some(Commands::SessionToken { subject, minutes }) => {
            let token = modes::issue_session_token(&get_config(), &subject, minutes)?;
            println!("{}", token);
            Ok(())
        }
        Some(Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        }) => {
            let path = modes::generate_config(output_path.as_deref(), force)?;
            println!("Sample configuration written to {}", path);
            Ok(())
        }
    }
}
