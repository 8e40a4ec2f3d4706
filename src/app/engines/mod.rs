pub mod angora;
pub mod snapshot;

pub use angora::AngoraEngine;
pub use snapshot::SnapshotEngine;

use crate::core::context::AdapterContext;
use crate::domain::model::EngineKind;
use crate::domain::ports::{Executor, FuzzerEngine};

pub fn create_engine<E: Executor + 'static>(
    kind: EngineKind,
    ctx: AdapterContext<E>,
) -> Box<dyn FuzzerEngine> {
    match kind {
        EngineKind::Angora => Box::new(AngoraEngine::new(ctx)),
        EngineKind::Snapshot => Box::new(SnapshotEngine::new(ctx)),
    }
}
