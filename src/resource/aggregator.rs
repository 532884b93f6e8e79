//! Resource Aggregator
//!
//! Collects every resource collection into one listing. A failing
//! source never sinks the others; its failure is reported alongside
//! whatever the healthy sources returned.

use serde::Serialize;

use super::fetcher;
use super::model::{ResourceKind, ResourceRecord};
use crate::openstack::session::Session;

/// Outcome of fetching one collection
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SourceReport {
    Collected {
        source: &'static str,
        count: usize,
    },
    Failed {
        source: &'static str,
        error: String,
    },
}

/// Combined result of one aggregation pass
#[derive(Debug, Default)]
pub struct Aggregate {
    pub resources: Vec<ResourceRecord>,
    pub reports: Vec<SourceReport>,
}

/// Fetch all collections in a fixed order, isolating failures per source
pub async fn collect_all(session: &Session) -> Aggregate {
    let mut aggregate = Aggregate::default();

    for kind in ResourceKind::ALL {
        match fetcher::list_resources(session, kind).await {
            Ok(records) => {
                aggregate.reports.push(SourceReport::Collected {
                    source: kind.as_str(),
                    count: records.len(),
                });
                aggregate.resources.extend(records);
            }
            Err(err) => {
                tracing::warn!(source = %kind, "failed to fetch collection: {:#}", err);
                aggregate.reports.push(SourceReport::Failed {
                    source: kind.as_str(),
                    error: format!("{:#}", err),
                });
            }
        }
    }

    aggregate
}
