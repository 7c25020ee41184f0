use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};

use banner_renderer::{BannerApp, BannerConfig, BannerRequest};

#[derive(Parser, Debug)]
#[command(name = "banner", version, about = "Compose logo + image + text banners")]
struct Cli {
    /// Config JSON (camelCase keys, every key optional).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a banner from the given logo, image and text.
    Generate(GenerateArgs),
    /// Render a saved banner again.
    Render { name: String },
    /// List saved banners.
    List,
    /// Print a saved banner's request as JSON.
    Show { name: String },
    /// Delete a saved banner.
    Delete { name: String },
    /// List the logos in the configured logo directory.
    Logos,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Logo path or URL, pasted on the left.
    #[arg(long)]
    logo: String,

    /// Secondary image path or URL.
    #[arg(long)]
    image: String,

    /// Text drawn beside the images.
    #[arg(long)]
    text: String,

    /// Name to save the banner under.
    #[arg(long)]
    name: Option<String>,

    /// Paste the secondary image on the right instead of using it as background.
    #[arg(long)]
    side_by_side: bool,

    /// Save the request under `--name` before rendering.
    #[arg(long, requires = "name")]
    save: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut app = BannerApp::new(config).context("initialize banner app")?;

    match cli.cmd {
        Command::Generate(args) => cmd_generate(&mut app, args),
        Command::Render { name } => {
            let path = app
                .regenerate(&name)
                .with_context(|| format!("render saved banner '{name}'"))?;
            println!("{}", path.display());
            Ok(())
        }
        Command::List => {
            for record in app.banners() {
                let mode = if record.background { "background" } else { "side-by-side" };
                println!("{:>4}  {:<24} {mode}", record.id, record.name);
            }
            Ok(())
        }
        Command::Show { name } => {
            let Some(request) = app.load(&name) else {
                bail!("no banner named '{name}'");
            };
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Command::Delete { name } => {
            if app.delete(&name)?.is_none() {
                bail!("no banner named '{name}'");
            }
            Ok(())
        }
        Command::Logos => {
            for logo in app.logos()? {
                println!("{:<24} {}", logo.name, logo.path.display());
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BannerConfig> {
    match path {
        Some(path) => BannerConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(BannerConfig::default()),
    }
}

fn cmd_generate(app: &mut BannerApp, args: GenerateArgs) -> anyhow::Result<()> {
    let mut request =
        BannerRequest::new(args.logo, args.image, args.text).with_background(!args.side_by_side);
    if let Some(name) = args.name {
        request = request.with_name(name);
    }

    let path = app
        .submit(&request, args.save)
        .context("generate banner")?;
    println!("{}", path.display());
    Ok(())
}
