use std::sync::Arc;

use crate::sim::SimHost;

fn sim(host: SimHost) -> Arc<SimHost> {
    Arc::new(host)
}

mod dispatch;
mod worker;
