//! Command-line tool for pushing content to Quote/0 e-ink displays.
//!
//! ```text
//! quote0 text --title "Hello" --message "From the CLI"
//! quote0 image --image-file screen.png --dither-type diffusion
//! ```
//!
//! The API token and device serial come from `--token`/`--device` or the
//! `QUOTE0_TOKEN`/`QUOTE0_DEVICE` environment variables.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use quote0::{BorderColor, Client, DitherKernel, DitherType, ImageRequest, TextRequest};

#[derive(Parser)]
#[command(name = "quote0", version, about = "Push content to Quote/0 e-ink displays")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Common {
    /// API token (format: dot_app_xxx)
    #[arg(long, env = "QUOTE0_TOKEN", hide_env_values = true)]
    token: String,

    /// Device serial number
    #[arg(long, env = "QUOTE0_DEVICE")]
    device: String,

    /// Trigger an immediate display refresh
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    refresh: bool,

    /// Optional URL opened by the companion app
    #[arg(long)]
    link: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Send a text layout (title, message, signature, icon)
    Text {
        #[command(flatten)]
        common: Common,

        /// Title, shown on the first line
        #[arg(long)]
        title: Option<String>,

        /// Message, shown on the next three lines
        #[arg(long)]
        message: Option<String>,

        /// Signature, shown at the bottom-right corner
        #[arg(long)]
        signature: Option<String>,

        /// Base64-encoded 40x40 PNG icon
        #[arg(long, conflicts_with = "icon_file")]
        icon: Option<String>,

        /// Path to a 40x40 PNG icon (base64-encoded internally)
        #[arg(long)]
        icon_file: Option<PathBuf>,
    },

    /// Send a full-screen 296x152 image
    Image {
        #[command(flatten)]
        common: Common,

        /// Base64-encoded 296x152 PNG
        #[arg(long, conflicts_with = "image_file")]
        image: Option<String>,

        /// Path to a 296x152 PNG (base64-encoded internally)
        #[arg(long)]
        image_file: Option<PathBuf>,

        /// Screen edge color: white or black
        #[arg(long)]
        border: Option<BorderColor>,

        /// Dither type: none, diffusion or ordered
        #[arg(long)]
        dither_type: Option<DitherType>,

        /// Dither kernel, e.g. floyd_steinberg or atkinson (only effective
        /// with --dither-type diffusion)
        #[arg(long)]
        dither_kernel: Option<DitherKernel>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Text {
            common,
            title,
            message,
            signature,
            icon,
            icon_file,
        } => {
            let client = build_client(&common)?;
            let mut req = TextRequest::new().with_refresh_now(common.refresh);
            req.title = title;
            req.message = message;
            req.signature = signature;
            req.link = common.link;
            req.icon = match (icon, icon_file) {
                (Some(b64), None) => Some(b64),
                (None, Some(path)) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("read icon file {}", path.display()))?;
                    use base64::Engine as _;
                    Some(base64::engine::general_purpose::STANDARD.encode(bytes))
                }
                (None, None) => None,
                (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
            };

            let resp = client.send_text(req).await?;
            println!("Text sent (code={} message={})", resp.code, resp.message);
        }
        Command::Image {
            common,
            image,
            image_file,
            border,
            dither_type,
            dither_kernel,
        } => {
            let client = build_client(&common)?;
            let mut req = ImageRequest::new().with_refresh_now(common.refresh);
            req.link = common.link;
            req.border = border;
            req.dither_type = dither_type;
            req.dither_kernel = dither_kernel;
            match (image, image_file) {
                (Some(b64), None) => req.image = Some(b64),
                (None, Some(path)) => req.image_path = Some(path),
                (None, None) => bail!("provide --image or --image-file"),
                (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
            }

            let resp = client.send_image(req).await?;
            println!("Image sent (code={} message={})", resp.code, resp.message);
        }
    }
    Ok(())
}

fn build_client(common: &Common) -> anyhow::Result<Client> {
    if common.device.trim().is_empty() {
        bail!("missing device serial (use --device or QUOTE0_DEVICE)");
    }
    let client = Client::new(common.token.clone())
        .context("missing API token (use --token or QUOTE0_TOKEN)")?
        .with_default_device(&common.device);
    Ok(client)
}
