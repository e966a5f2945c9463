use clap::Subcommand;
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::{
    cli::{Error, error},
    config::Config,
    ui::table::PresetExt,
};

#[derive(Clone, Subcommand)]
pub enum PresetCommands {
    #[command(alias = "l", about = "List the patch presets defined in the configuration")]
    List,
}

impl PresetCommands {
    pub async fn run(self, config: Config) -> Result<(), Error> {
        match self {
            Self::List => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(config.presets.render_table().as_bytes())
                    .await
                    .context(error::WriteStdoutSnafu)?;
                stdout.write_u8(b'\n').await.context(error::WriteStdoutSnafu)
            }
        }
    }
}
