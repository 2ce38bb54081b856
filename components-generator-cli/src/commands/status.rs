//! Cache status command

use chrono::{DateTime, Utc};
use components_generator::config::GeneratorConfig;
use components_generator::freshness::{CacheMetadata, StaleReason};
use components_generator::Generator;
use console::style;

use super::{INFO, SUCCESS, WARN};

/// Show the freshness of the cached library
pub struct StatusCommand;

impl StatusCommand {
    /// Execute the command
    pub fn execute(generator: &Generator) {
        let now = Utc::now();
        let gate = generator.gate();
        let stale = gate.check(now).map(|pending| pending.reason().clone());
        println!(
            "{}",
            render_status(generator.config(), gate.metadata().as_ref(), stale.as_ref(), now)
        );
    }
}

/// Freshness line followed by the recorded fetch details
#[must_use]
pub fn render_status(
    config: &GeneratorConfig,
    metadata: Option<&CacheMetadata>,
    stale: Option<&StaleReason>,
    now: DateTime<Utc>,
) -> String {
    let mut out = match stale {
        None => format!("{} {}", SUCCESS, style("Component library is fresh").green()),
        Some(reason) => format!(
            "{} {} ({reason})",
            WARN,
            style("Component library needs a refresh").yellow()
        ),
    };

    out.push_str(&format!("\n  build dir:   {}", config.build_dir.display()));
    out.push_str(&format!("\n  source:      {}", config.effective_url()));
    out.push_str(&format!("\n  ttl:         {}s", config.cache_ttl_secs));

    match metadata {
        Some(metadata) => {
            let age = now.signed_duration_since(metadata.fetched_at).num_seconds();
            out.push_str(&format!(
                "\n  fetched at:  {} ({age}s ago)",
                metadata.fetched_at.to_rfc3339()
            ));
            out.push_str(&format!("\n  library:     {}", metadata.library_dir));
        }
        None => out.push_str(&format!("\n{} Nothing fetched yet", INFO)),
    }
    out
}
