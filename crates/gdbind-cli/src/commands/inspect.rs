//! `gdbind inspect`: Show how one class is bound.

use crate::commands;
use crate::output::Report;
use anyhow::anyhow;
use gdbind_runtime::Member;
use std::path::Path;
use termcolor::ColorChoice;

/// One-line description of a bound member, without its kind
pub fn describe(name: &str, member: &Member) -> String {
    match member {
        Member::Method(m) => {
            let params: Vec<String> = m.descriptor().params.iter().map(|p| p.to_string()).collect();
            format!("{}({}) -> {}", name, params.join(", "), m.descriptor().returns)
        }
        Member::Property(p) => {
            let mut line = format!("{}: {}", name, p.descriptor().ty);
            if p.is_read_only() {
                line.push_str(" (read-only)");
            }
            line
        }
        Member::Constant(c) => format!("{} = {}", name, c.value),
        Member::Signal(_) => name.to_string(),
    }
}

pub fn execute(
    database: &Path,
    class: &str,
    config: Option<&Path>,
    own: bool,
    color: ColorChoice,
) -> anyhow::Result<()> {
    let loaded = commands::load(database, config)?;
    let ty = loaded
        .lattice
        .get(class)
        .ok_or_else(|| anyhow!("unknown class '{}' in '{}'", class, database.display()))?;

    let mut out = Report::new(color);
    let chain: Vec<&str> = loaded
        .lattice
        .hierarchy(ty.id())
        .iter()
        .map(|t| t.name())
        .collect();
    out.heading(&chain.join(" -> "));

    let descriptor = ty.descriptor();
    if descriptor.singleton {
        out.highlight(&format!("singleton '{}'", descriptor.binding_name()));
        out.end_line();
    }
    if !descriptor.instantiable {
        out.caution("not instantiable");
        out.end_line();
    }

    let members = if own { ty.own_members() } else { ty.members() };
    for (name, member) in members.sorted() {
        let inherited = Some(member.owner()).filter(|owner| *owner != ty.name());
        out.member(&member.kind().to_string(), &describe(name, member), inherited);
    }
    out.finish();
    Ok(())
}
