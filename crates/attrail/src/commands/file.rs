use std::path::Path;

use anyhow::Result;
use attestation_models::load_archive;

use crate::render;

pub fn run(data_file: &Path, out: Option<&Path>) -> Result<()> {
    let records = load_archive(data_file)?;
    let classified = transition_engine::classify(&records)?;
    render::render(&classified, out)
}
