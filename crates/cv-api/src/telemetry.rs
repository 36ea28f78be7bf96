//! Tracing subscriber setup.

use cv_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber. `RUST_LOG` wins over `log_level` when set.
pub fn init_telemetry(log_level: &str, format: LogFormat) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{},cv_api={},tower_http=debug", log_level, log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer().event_format(
                    Format::default().compact().with_target(false),
                ),
            )
            .try_init()?,
    }

    tracing::info!(log_level, format = ?format, "Tracing initialized");
    Ok(())
}
