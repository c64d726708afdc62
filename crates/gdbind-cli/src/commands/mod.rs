//! CLI command implementations.

pub mod check;
pub mod inspect;

use anyhow::Context;
use gdbind_runtime::{ClassDatabase, RuntimeOptions, TypeLattice};
use std::path::Path;

/// A database loaded and synthesized the way a runtime would
pub struct Loaded {
    pub database: ClassDatabase,
    pub options: RuntimeOptions,
    pub lattice: TypeLattice,
}

/// Load a class database plus optional runtime options, then synthesize types.
///
/// No native channel is involved, so singleton instances are not looked up.
pub fn load(database: &Path, config: Option<&Path>) -> anyhow::Result<Loaded> {
    let options = match config {
        Some(path) => RuntimeOptions::from_file(path)
            .with_context(|| format!("cannot use options '{}'", path.display()))?,
        None => RuntimeOptions::default(),
    };
    let db = ClassDatabase::from_file(database)
        .with_context(|| format!("cannot load '{}'", database.display()))?;
    let lattice = TypeLattice::synthesize(&db, &options)
        .with_context(|| format!("cannot bind '{}'", database.display()))?;
    tracing::debug!(classes = lattice.len(), "database ready");
    Ok(Loaded {
        database: db,
        options,
        lattice,
    })
}
