use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Dependencies stay at `warn` so raising the service level to `debug`
/// surfaces ledger stage logs without sqlx or hyper chatter.
const QUIET_DEPENDENCIES: &[&str] = &["sqlx", "hyper", "h2", "tower"];

/// Directive used when `RUST_LOG` is not set.
fn default_directive(log_level: &str) -> String {
    let mut directives = vec![
        log_level.to_string(),
        format!("gradeledger={log_level}"),
        format!("tower_http={log_level}"),
    ];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|target| format!("{target}=warn")));
    directives.join(",")
}

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let telemetry = settings.telemetry();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&telemetry.log_level)))?;

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let installed = if telemetry.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::debug!(
        environment = settings.runtime().environment.as_str(),
        json = telemetry.json,
        "Tracing initialised"
    );
    Ok(())
}
