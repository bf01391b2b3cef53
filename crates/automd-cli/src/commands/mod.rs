pub mod cap;
pub mod constraints;
pub mod format;
pub mod ligand;
pub mod mainchain;
pub mod qm_structure;
pub mod rename;
pub mod tools;

use crate::cli::{ConfigArgs, PrepArgs};
use crate::config::PartialPrepConfig;
use crate::error::Result;
use automd::engine::config::{CapNames, PrepConfig};
use tracing::info;

fn load_prep_config(args: &PrepArgs) -> Result<PrepConfig> {
    let partial = PartialPrepConfig::load(&args.common)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial.merge_with_cli(args)?;
    info!(
        residue = %config.residue_name,
        kind = %config.residue_kind,
        method = %config.charge_method,
        "Resolved preparation configuration"
    );
    Ok(config)
}

fn load_caps(args: &ConfigArgs) -> Result<CapNames> {
    PartialPrepConfig::load(args)?.resolve_caps(args)
}
