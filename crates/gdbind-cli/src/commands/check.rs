//! `gdbind check`: Load and synthesize a class database.

use crate::commands::{self, Loaded};
use crate::output::Report;
use std::path::Path;
use termcolor::ColorChoice;

/// Counts reported by `check`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub classes: usize,
    pub methods: usize,
    pub hidden_methods: usize,
    pub properties: usize,
    pub read_only: usize,
    pub constants: usize,
    pub signals: usize,
    pub singletons: Vec<String>,
    pub globals: usize,
    pub depth: usize,
}

impl Summary {
    pub fn collect(loaded: &Loaded) -> Self {
        let mut summary = Summary {
            classes: loaded.database.len(),
            globals: loaded.database.constants().len(),
            ..Summary::default()
        };

        for ty in loaded.lattice.iter() {
            let class = ty.descriptor();
            summary.depth = summary.depth.max(ty.chain().len());
            summary.properties += class.properties.len();
            summary.read_only += class
                .properties
                .values()
                .filter(|p| p.is_read_only())
                .count();
            summary.constants += class.constants.len();
            summary.signals += class.signals.len();
            summary.methods += class.methods.len();
            if !loaded.options.expose_private_methods {
                summary.hidden_methods += class.methods.iter().filter(|m| m.is_private()).count();
            }

            if class.singleton {
                summary.singletons.push(class.binding_name().to_string());
            }
        }
        summary
    }
}

pub fn execute(database: &Path, config: Option<&Path>, color: ColorChoice) -> anyhow::Result<()> {
    let mut out = Report::new(color);
    let subject = database.display().to_string();

    let loaded = match commands::load(database, config) {
        Ok(loaded) => loaded,
        Err(e) => {
            out.status(false, &subject);
            out.finish();
            return Err(e);
        }
    };
    let summary = Summary::collect(&loaded);

    out.status(true, &subject);

    out.count("classes", summary.classes);
    out.note(&format!(
        "root {}, deepest chain {}",
        loaded.lattice.root().name(),
        summary.depth
    ));
    out.end_line();

    out.count("methods", summary.methods);
    if summary.hidden_methods > 0 {
        out.note(&format!("{} private, hidden", summary.hidden_methods));
    } else if loaded.options.expose_private_methods {
        out.note("private methods exposed");
    }
    out.end_line();

    out.count("properties", summary.properties);
    if summary.read_only > 0 {
        out.note(&format!("{} read-only", summary.read_only));
    }
    out.end_line();

    out.count("constants", summary.constants);
    out.end_line();
    out.count("signals", summary.signals);
    out.end_line();

    out.count("singletons", summary.singletons.len());
    if !summary.singletons.is_empty() {
        out.highlight(&summary.singletons.join(", "));
    }
    out.end_line();

    out.count("globals", summary.globals);
    out.end_line();
    out.finish();
    Ok(())
}
