mod app;
mod browser;
mod command;
mod html_view;

use self::app::{Args, RunCmd};
use clap::Parser;

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Display the current version.
    #[clap(name = "version")]
    Version,

    /// Run the live preview.
    #[clap(flatten)]
    Run(RunCmd),
}

#[derive(Parser, Debug)]
#[clap(name = "livepreview", disable_version_flag = true)]
pub struct LivePreview {
    #[clap(flatten)]
    pub args: Args,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let live_preview = LivePreview::parse();

    match live_preview.cmd {
        Cmd::Version => {
            println!("livepreview {}", env!("CARGO_PKG_VERSION"));
        }
        Cmd::Run(run_cmd) => {
            if let Err(e) = run_cmd.run(live_preview.args).await {
                eprintln!("error: {e:?}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
