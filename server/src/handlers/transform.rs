//! Transform handler - turns a batch of events into warehouse rows.

use crate::error::Result;
use whrow_engine::{IncomingEvent, TransformResult, Transformer};

/// Process a transform request.
pub fn handle_transform(
    transformer: &Transformer,
    events: &[IncomingEvent],
) -> Result<TransformResult> {
    let result = transformer.transform(events)?;

    tracing::info!(
        events = events.len(),
        rows = result.events.len(),
        failed = result.failed_events.len(),
        "Transformed batch"
    );

    Ok(result)
}
