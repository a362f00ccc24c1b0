use cfscan_types::{PlanNodeId, TupleId};

/// Plan-time description of one scan node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanNodePlan {
    pub node_id: PlanNodeId,
    /// Tuple descriptor the node fills.
    pub tuple_id: TupleId,
    pub table_name: String,
    /// Stop after this many rows have been returned.
    pub limit: Option<u64>,
}

impl ScanNodePlan {
    pub fn new(node_id: PlanNodeId, tuple_id: TupleId, table_name: impl Into<String>) -> Self {
        Self {
            node_id,
            tuple_id,
            table_name: table_name.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
