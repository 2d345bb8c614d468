// commands/mod.rs — CLI subcommand implementations.

pub mod cycle;
pub mod plan;
pub mod signals;
pub mod submit;
pub mod suggestion;

use cov_plan::Domain;

/// Parse a domain name as typed by a user.
pub fn parse_domain(value: &str) -> anyhow::Result<Domain> {
    match value.to_uppercase().as_str() {
        "BODY" => Ok(Domain::Body),
        "RESOURCES" => Ok(Domain::Resources),
        "FOCUS" => Ok(Domain::Focus),
        "CREATION" => Ok(Domain::Creation),
        other => anyhow::bail!("unknown domain '{other}' (BODY, RESOURCES, FOCUS, CREATION)"),
    }
}
