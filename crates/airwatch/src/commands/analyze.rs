//! One-shot analysis: one cycle per snapshot file (or one cycle from the
//! configured source when none are given), then print.

use tracing::debug;

use airwatch_core::{Alert, AnySource, SnapshotSource};

use crate::cli::{AnalyzeArgs, ShowMode};
use crate::error::CliError;

use super::Context;
use super::util;

pub async fn handle(args: AnalyzeArgs, ctx: &Context) -> Result<(), CliError> {
    let query = util::build_query(&args.filter)?;
    let mut engine = util::build_engine(ctx)?;

    let sources: Vec<AnySource> = if args.snapshots.is_empty() {
        vec![util::resolve_source(None, ctx)?]
    } else {
        args.snapshots
            .iter()
            .map(|path| util::build_source(path, ctx).into())
            .collect()
    };

    let mut last_raised: Vec<Alert> = Vec::new();
    for source in &sources {
        let snapshot = source.load().await?;
        last_raised = engine.analyze_snapshot(&snapshot);
        debug!(
            source = %source.describe(),
            raised = last_raised.len(),
            active = engine.store().active_count(),
            "cycle finished"
        );
    }

    for id in &args.ack {
        engine.acknowledge(id)?;
        if !ctx.quiet() {
            eprintln!("Acknowledged {id}");
        }
    }

    let selected: Vec<Alert> = match args.show {
        // Pick up acknowledgments made above.
        ShowMode::New => last_raised
            .into_iter()
            .map(|alert| match engine.store().get(alert.id.as_str()) {
                Some(current) if current.created_at == alert.created_at => current.clone(),
                _ => alert,
            })
            .collect(),
        ShowMode::Active => engine.list_active(),
        ShowMode::History => engine.list_history(),
    };

    util::print_alerts(&query.apply(selected), ctx);
    Ok(())
}
